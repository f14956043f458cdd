//! Call requests extracted from model output and the outcomes fed back.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCall {
    pub name: String,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallRequest {
    Tool(ToolCall),
    Agent(AgentCall),
}

impl CallRequest {
    pub fn name(&self) -> &str {
        match self {
            CallRequest::Tool(call) => &call.name,
            CallRequest::Agent(call) => &call.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CallRequest::Tool(_) => "tool",
            CallRequest::Agent(_) => "agent",
        }
    }

    pub fn not_found_message(&self) -> String {
        format!("{} {} not found", self.kind(), self.name())
    }
}

/// Text result of one tool or agent call, as serialized into
/// `<tool_result>` / `<agent_result>` feedback turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallOutcome {
    pub name: String,
    pub output: String,
}
