use super::agent::RawAgent;
use super::app::AppConfig;
use super::error::ConfigError;
use super::provider::{ProviderConfig, RawProviderConfig};
use crate::constants::{
    CONFIG_PATH, DEFAULT_MAX_DELEGATION_DEPTH, DEFAULT_MAX_ROUNDS, DEFAULT_STORE_DIR, ENV_PATH,
};
use dotenvy::from_filename;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, warn};

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    default_agent: Option<String>,
    max_rounds: Option<usize>,
    max_delegation_depth: Option<usize>,
    store_dir: Option<PathBuf>,
    provider: Option<RawProviderConfig>,
    #[serde(default)]
    agents: Vec<RawAgent>,
}

/// Ensures environment variables are loaded from config/.env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename(ENV_PATH);
    });
}

/// Load and validate configuration from a file path
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    let config_path = path.unwrap_or_else(|| Path::new(CONFIG_PATH));
    read_config(config_path)
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading agent configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_config(&content, path)
}

pub(super) fn parse_config(content: &str, path: &Path) -> Result<AppConfig, ConfigError> {
    let parsed: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_and_build(parsed)
}

fn validate_and_build(parsed: RawConfig) -> Result<AppConfig, ConfigError> {
    let provider = build_provider(parsed.provider.ok_or(ConfigError::MissingProvider)?)?;

    let max_rounds = parsed.max_rounds.unwrap_or(DEFAULT_MAX_ROUNDS);
    if max_rounds == 0 {
        return Err(ConfigError::ZeroMaxRounds);
    }

    if parsed.agents.is_empty() {
        return Err(ConfigError::NoAgents);
    }

    let mut seen = HashSet::new();
    for (index, agent) in parsed.agents.iter().enumerate() {
        if agent.name.trim().is_empty() {
            return Err(ConfigError::UnnamedAgent { index });
        }
        if !seen.insert(agent.name.as_str()) {
            return Err(ConfigError::DuplicateAgent {
                name: agent.name.clone(),
            });
        }
    }
    for agent in &parsed.agents {
        for sub in &agent.agents {
            if !seen.contains(sub.name.as_str()) {
                warn!(agent = %agent.name, sub_agent = %sub.name, "Sub-agent is not defined in this configuration");
            }
        }
    }

    let default_agent = match parsed.default_agent {
        Some(name) if !seen.contains(name.as_str()) => {
            return Err(ConfigError::UnknownDefaultAgent { name });
        }
        Some(name) => name,
        None => parsed.agents[0].name.clone(),
    };

    Ok(AppConfig {
        default_agent,
        max_rounds,
        max_delegation_depth: parsed
            .max_delegation_depth
            .unwrap_or(DEFAULT_MAX_DELEGATION_DEPTH),
        store_dir: parsed
            .store_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR)),
        provider,
        agents: parsed.agents.into_iter().map(Into::into).collect(),
    })
}

fn build_provider(raw: RawProviderConfig) -> Result<ProviderConfig, ConfigError> {
    let provider_type = raw.provider_type.unwrap_or_else(|| "gemini".to_string());
    let id = raw.id.unwrap_or_else(|| provider_type.clone());
    let endpoint = raw
        .endpoint
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEndpoint {
            provider: id.clone(),
        })?;
    let model = raw
        .model
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingModel {
            provider: id.clone(),
        })?;

    Ok(ProviderConfig {
        id,
        provider_type,
        endpoint,
        api_key: raw.api_key,
        api_path: raw.api_path,
        model,
    })
}
