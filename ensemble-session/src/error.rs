use ensemble_core::agent::AgentError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid {kind} key '{value}'")]
    InvalidKey { kind: &'static str, value: String },
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode or decode record '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session key required")]
    MissingSessionKey,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            SessionError::MissingSessionKey => "A session key is required.".to_string(),
            SessionError::Store(_) => {
                "Conversation state could not be loaded or saved. Try again later.".to_string()
            }
            SessionError::Agent(err) => err.user_message(),
        }
    }
}
