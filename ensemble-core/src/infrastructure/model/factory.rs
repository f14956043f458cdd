//! Provider factory - creates clients from config

use super::clients::GeminiClient;
use super::traits::ModelProvider;
use super::types::ModelError;
use crate::config::ProviderConfig;
use std::env;
use std::sync::Arc;
use tracing::warn;

/// Resolve API key from the environment variable named in the config.
pub fn resolve_api_key(provider: &str, spec: Option<&str>) -> Option<String> {
    let raw = spec.map(str::trim)?;
    if raw.is_empty() {
        return None;
    }
    match env::var(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                provider,
                env_var = raw,
                %err,
                "API key environment variable is not set"
            );
            None
        }
    }
}

/// Creates a model provider based on provider type.
///
/// Supported types: `gemini`, `google`, `google-ai`.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn ModelProvider>, ModelError> {
    match config.provider_type.to_lowercase().as_str() {
        "gemini" | "google" | "google-ai" => Ok(Arc::new(GeminiClient::from_config(config))),
        other => Err(ModelError::unsupported_provider_type(&config.id, other)),
    }
}
