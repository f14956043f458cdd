use crate::application::agent::AgentError;
use thiserror::Error;

/// Raised while building an agent's catalog. Fatal at construction time.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("tool {0} not found")]
    UnknownTool(String),
    #[error("agent {0} cannot be registered without an agent dispatcher")]
    MissingDispatcher(String),
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("input type of tool '{tool}' must be a plain record, found schema type {found}")]
    NotAnObject { tool: String, found: String },
    #[error("failed to serialize input schema of tool '{tool}': {source}")]
    Serialize {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure reported by an inbuilt tool. Fed back to the model as
/// `error: <message>` rather than failing the call.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ToolFailure {
    message: String,
}

impl ToolFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolInvokeError {
    #[error("failed to unmarshal JSON input for tool {tool}: {source}")]
    InvalidInput {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode output of tool {tool}: {source}")]
    Encode {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("remote tool {tool} on service '{service}' is not reachable from this runtime")]
    RemoteUnavailable { tool: String, service: String },
    #[error("tool {0} was cancelled")]
    Cancelled(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("agent {0} not found")]
    UnknownAgent(String),
    #[error("agent {name} exceeds the maximum delegation depth of {limit}")]
    DepthExceeded { name: String, limit: usize },
    #[error(transparent)]
    Agent(#[from] AgentError),
}
