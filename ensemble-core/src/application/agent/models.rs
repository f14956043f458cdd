use crate::application::tooling::{AgentDescriptor, ToolDescriptor};
use crate::constants::{DEFAULT_MAX_DELEGATION_DEPTH, DEFAULT_MAX_ROUNDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentOptions {
    /// Hard cap on model rounds per run, correction rounds included.
    pub max_rounds: usize,
    /// Deepest allowed chain of nested agent delegations.
    pub max_delegation_depth: usize,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            max_delegation_depth: DEFAULT_MAX_DELEGATION_DEPTH,
        }
    }
}

/// Tool entry of an agent definition.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolSpec {
    /// Inbuilt tool resolved from the registry by name.
    Inbuilt(String),
    /// Tool hosted by another service, known only by its descriptor.
    Remote(ToolDescriptor),
}

/// Everything needed to build one [`Agent`](super::Agent).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentDefinition {
    pub name: String,
    pub description: String,
    pub context: String,
    pub tools: Vec<ToolSpec>,
    pub agents: Vec<AgentDescriptor>,
}

impl AgentDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_tool(mut self, name: impl Into<String>) -> Self {
        self.tools.push(ToolSpec::Inbuilt(name.into()));
        self
    }

    pub fn with_remote_tool(mut self, descriptor: ToolDescriptor) -> Self {
        self.tools.push(ToolSpec::Remote(descriptor));
        self
    }

    pub fn with_agent(mut self, descriptor: AgentDescriptor) -> Self {
        self.agents.push(descriptor);
        self
    }

    pub fn descriptor(&self) -> AgentDescriptor {
        AgentDescriptor::new(&self.name, &self.description)
    }
}
