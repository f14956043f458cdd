use super::runtime::parser::CodecError;
use crate::application::tooling::CatalogError;
use crate::model::ModelError;
use thiserror::Error;

const PROTOCOL_ERROR_MESSAGE: &str = "error processing your request, please try again later";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent {0} not found")]
    UnknownAgent(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Generation(#[from] ModelError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("model response carried a <response> block without <task_status>")]
    MissingTaskStatus,
    #[error("failed to encode call outcomes: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("agent did not finish within {limit} rounds")]
    MaxRoundsExceeded { limit: usize },
    #[error("agent run was cancelled")]
    Cancelled,
}

impl AgentError {
    pub fn user_message(&self) -> String {
        match self {
            AgentError::UnknownAgent(name) => format!("Agent \"{name}\" is not configured."),
            AgentError::Catalog(err) => format!("Agent configuration is invalid: {err}."),
            AgentError::Generation(err) => err.user_message(),
            AgentError::MissingTaskStatus | AgentError::Serialization(_) => {
                PROTOCOL_ERROR_MESSAGE.to_string()
            }
            AgentError::Codec(_) => {
                "The model requested a tool with malformed parameters. Try rephrasing the request."
                    .to_string()
            }
            AgentError::MaxRoundsExceeded { .. } => {
                "The agent could not finish the task within its round limit.".to_string()
            }
            AgentError::Cancelled => "The request was cancelled.".to_string(),
        }
    }
}
