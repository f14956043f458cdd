//! Gemini client implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::config::ProviderConfig;
use crate::constants::DEFAULT_GEMINI_API_PATH;
use crate::domain::context::CallContext;
use crate::domain::types::{AgentInput, ChatMessage, MessageRole, TokenStats};
use crate::infrastructure::model::factory::resolve_api_key;
use crate::infrastructure::model::traits::ModelProvider;
use crate::infrastructure::model::types::{GenerateRequest, GenerateResponse, ModelError};

/// Gemini client for Google AI
#[derive(Clone)]
pub struct GeminiClient {
    base: HttpClientBase,
    api_path: String,
    model: String,
}

impl GeminiClient {
    pub fn from_config(config: &ProviderConfig) -> Self {
        let api_key = resolve_api_key(&config.id, config.api_key.as_deref());
        Self {
            base: HttpClientBase::new(config.id.clone(), config.endpoint.clone(), api_key),
            api_path: config
                .api_path
                .clone()
                .unwrap_or_else(|| DEFAULT_GEMINI_API_PATH.to_string()),
            model: config.model.clone(),
        }
    }

    fn build_model_url(&self) -> String {
        let base = self.base.endpoint.trim_end_matches('/');
        let path = self.api_path.trim_matches('/');
        format!("{base}/{path}/{}:generateContent", self.model)
    }
}

#[async_trait]
impl ModelProvider for GeminiClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn generate(
        &self,
        _ctx: &CallContext,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, ModelError> {
        let url = self.build_model_url();
        let payload = GeminiRequest::from_request(&request);

        info!(
            provider = self.base.id.as_str(),
            model = self.model.as_str(),
            turns = payload.contents.len(),
            "Sending request to Gemini"
        );

        let response: GeminiResponse = self.base.post_with_query_key(&url, &payload).await?;
        debug!("Received response from Gemini");

        let stats = response
            .usage_metadata
            .as_ref()
            .map(GeminiUsage::to_stats)
            .unwrap_or_default();

        let text = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "missing text"))?;

        Ok(GenerateResponse::new(text, stats))
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

impl GeminiRequest {
    fn from_request(request: &GenerateRequest) -> Self {
        let mut contents: Vec<GeminiContent> =
            request.history.iter().map(GeminiContent::from_message).collect();
        if let Some(input) = GeminiContent::from_input(&request.input) {
            contents.push(input);
        }

        let system_instruction = (!request.system_prompt.is_empty()).then(|| GeminiContent {
            role: None,
            parts: vec![GeminiPart::text(&request.system_prompt)],
        });

        Self {
            contents,
            system_instruction,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn from_message(message: &ChatMessage) -> Self {
        let role = match message.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "model",
        };
        Self {
            role: Some(role.to_string()),
            parts: vec![GeminiPart::text(&message.content)],
        }
    }

    fn from_input(input: &AgentInput) -> Option<Self> {
        let mut parts: Vec<GeminiPart> = input
            .images
            .iter()
            .filter(|image| !image.data.is_empty())
            .map(|image| GeminiPart {
                text: None,
                inline_data: Some(GeminiInlineData {
                    mime_type: image
                        .mime_type
                        .clone()
                        .unwrap_or_else(|| "image/png".to_string()),
                    data: image.data.clone(),
                }),
            })
            .collect();
        if !input.text.is_empty() {
            parts.push(GeminiPart::text(&input.text));
        }
        (!parts.is_empty()).then(|| Self {
            role: Some("user".to_string()),
            parts,
        })
    }
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
}

impl GeminiPart {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GeminiUsage {
    prompt_token_count: i32,
    candidates_token_count: i32,
    total_token_count: i32,
}

impl GeminiUsage {
    fn to_stats(&self) -> TokenStats {
        TokenStats {
            input_token_count: self.prompt_token_count,
            output_token_count: self.candidates_token_count,
            total_token_count: self.total_token_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ImageInput;
    use serde_json::json;

    #[test]
    fn request_maps_roles_and_appends_input() {
        let request = GenerateRequest {
            system_prompt: "be brief".into(),
            history: vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")],
            input: AgentInput {
                text: "<user_input>time?</user_input>".into(),
                images: vec![ImageInput {
                    data: "aGk=".into(),
                    path: String::new(),
                    mime_type: None,
                }],
                ..AgentInput::default()
            },
        };

        let value = serde_json::to_value(GeminiRequest::from_request(&request)).expect("json");
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["contents"][2]["parts"][0]["inline_data"]["mime_type"], "image/png");
        assert_eq!(
            value["contents"][2]["parts"][1]["text"],
            "<user_input>time?</user_input>"
        );
        assert_eq!(value["system_instruction"]["parts"][0]["text"], "be brief");
    }

    #[test]
    fn empty_input_adds_no_turn() {
        let request = GenerateRequest {
            system_prompt: String::new(),
            history: vec![ChatMessage::user("hi")],
            input: AgentInput::default(),
        };
        let value = serde_json::to_value(GeminiRequest::from_request(&request)).expect("json");
        assert_eq!(value["contents"].as_array().map(Vec::len), Some(1));
        assert!(value.get("system_instruction").is_none());
    }

    #[test]
    fn usage_metadata_maps_to_stats() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "a"}, {"text": "b"}]}}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 3, "totalTokenCount": 13}
        }))
        .expect("parse");
        let stats = response.usage_metadata.as_ref().map(GeminiUsage::to_stats);
        assert_eq!(stats.map(|s| s.total_token_count), Some(13));
    }
}
