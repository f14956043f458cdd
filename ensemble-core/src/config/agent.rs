use crate::application::agent::{AgentDefinition, ToolSpec};
use crate::application::tooling::{AgentDescriptor, ToolDescriptor};
use serde::Deserialize;
use serde_json::Value;

/// Tool entry of an `[[agents]]` block: an inbuilt tool name or a remote
/// tool descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTool {
    Name(String),
    Remote {
        name: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        service_name: String,
        #[serde(default)]
        parameters: Option<Value>,
    },
}

impl From<RawTool> for ToolSpec {
    fn from(value: RawTool) -> Self {
        match value {
            RawTool::Name(name) => ToolSpec::Inbuilt(name),
            RawTool::Remote {
                name,
                description,
                service_name,
                parameters,
            } => ToolSpec::Remote(ToolDescriptor {
                name,
                service_name,
                description,
                parameters: parameters
                    .unwrap_or_else(|| serde_json::json!({"type": "object", "properties": {}})),
                inbuilt: false,
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawAgent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub tools: Vec<RawTool>,
    #[serde(default)]
    pub agents: Vec<AgentDescriptor>,
}

impl From<RawAgent> for AgentDefinition {
    fn from(value: RawAgent) -> Self {
        Self {
            name: value.name,
            description: value.description,
            context: value.context,
            tools: value.tools.into_iter().map(ToolSpec::from).collect(),
            agents: value.agents,
        }
    }
}
