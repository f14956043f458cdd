use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required [provider] section in configuration")]
    MissingProvider,

    #[error("provider '{provider}' is missing required field 'endpoint'")]
    MissingEndpoint { provider: String },

    #[error("provider '{provider}' is missing required field 'model'")]
    MissingModel { provider: String },

    #[error("no agents configured - at least one [[agents]] entry is required")]
    NoAgents,

    #[error("agent '{name}' is defined more than once")]
    DuplicateAgent { name: String },

    #[error("agent entry #{index} has an empty name")]
    UnnamedAgent { index: usize },

    #[error("default agent '{name}' not found in configured agents")]
    UnknownDefaultAgent { name: String },

    #[error("'max_rounds' must be at least 1")]
    ZeroMaxRounds,
}
