//! Model types - Request, Response, and Error types

use crate::domain::types::{AgentInput, ChatMessage, TokenStats};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub system_prompt: String,
    pub history: Vec<ChatMessage>,
    pub input: AgentInput,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateResponse {
    pub text: String,
    pub stats: TokenStats,
}

impl GenerateResponse {
    pub fn new(text: impl Into<String>, stats: TokenStats) -> Self {
        Self {
            text: text.into(),
            stats,
        }
    }
}

/// Model errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("provider '{provider}' requires an API key")]
    MissingApiKey { provider: String },
    #[cfg(feature = "http-providers")]
    #[error("network error calling provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider '{provider}' returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
    #[error("unsupported provider type '{provider_type}' for provider '{provider}'")]
    UnsupportedProviderType {
        provider: String,
        provider_type: String,
    },
    #[error("provider '{provider}' failed: {reason}")]
    Backend { provider: String, reason: String },
}

impl ModelError {
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    #[cfg(feature = "http-providers")]
    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_provider_type(
        provider: impl Into<String>,
        provider_type: impl Into<String>,
    ) -> Self {
        Self::UnsupportedProviderType {
            provider: provider.into(),
            provider_type: provider_type.into(),
        }
    }

    pub fn backend(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Backend {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ModelError::MissingApiKey { provider } => format!(
                "Model provider '{provider}' needs an API key. Set the environment variable named in the configuration."
            ),
            #[cfg(feature = "http-providers")]
            ModelError::Network { provider, source } => {
                if source.is_connect() {
                    format!("Cannot reach model provider '{provider}'.")
                } else if source.is_timeout() {
                    format!("Request to model provider '{provider}' timed out. Try again shortly.")
                } else if let Some(status) = source.status() {
                    format!(
                        "Model provider '{provider}' rejected the request with status {}.",
                        status.as_u16()
                    )
                } else {
                    format!("Network error while contacting model provider '{provider}'.")
                }
            }
            ModelError::InvalidResponse { provider, .. } => {
                format!("Model provider '{provider}' returned a response that could not be processed.")
            }
            ModelError::UnsupportedProviderType { provider_type, .. } => {
                format!("Provider type '{provider_type}' is not supported.")
            }
            ModelError::Backend { provider, .. } => {
                format!("Model provider '{provider}' failed to generate a reply.")
            }
        }
    }
}
