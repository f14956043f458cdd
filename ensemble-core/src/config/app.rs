use super::error::ConfigError;
use super::provider::ProviderConfig;
use crate::application::agent::{AgentDefinition, AgentOptions};
use std::path::{Path, PathBuf};

/// Application configuration loaded from agent.toml
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_agent: String,
    pub max_rounds: usize,
    pub max_delegation_depth: usize,
    pub store_dir: PathBuf,
    pub provider: ProviderConfig,
    pub agents: Vec<AgentDefinition>,
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    /// Parse and validate configuration held in memory.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        super::loader::parse_config(content, Path::new("<inline>"))
    }

    pub fn agent_options(&self) -> AgentOptions {
        AgentOptions {
            max_rounds: self.max_rounds,
            max_delegation_depth: self.max_delegation_depth,
        }
    }

    pub fn agent(&self, name: &str) -> Option<&AgentDefinition> {
        self.agents.iter().find(|agent| agent.name == name)
    }
}
