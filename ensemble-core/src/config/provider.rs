use serde::{Deserialize, Serialize};

/// Connection settings for the model backend.
///
/// ```toml
/// [provider]
/// id = "gemini"
/// type = "gemini"
/// endpoint = "https://generativelanguage.googleapis.com"
/// api_key = "GEMINI_API_KEY"
/// model = "gemini-2.0-flash"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Identifier used in logs and error messages.
    pub id: String,
    /// Backend API family, e.g. `gemini`.
    #[serde(rename = "type")]
    pub provider_type: String,
    pub endpoint: String,
    /// Name of the environment variable holding the API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API path override (e.g., "v1beta/models" for Gemini)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_path: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct RawProviderConfig {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub provider_type: Option<String>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub api_path: Option<String>,
    pub model: Option<String>,
}
