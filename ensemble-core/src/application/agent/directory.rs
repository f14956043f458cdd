use super::errors::AgentError;
use super::models::{AgentDefinition, AgentOptions};
use super::runner::Agent;
use crate::application::tooling::{AgentDispatcher, DispatchError, ToolRegistry};
use crate::domain::context::CallContext;
use crate::domain::history::TaskHistory;
use crate::domain::types::{AgentInput, AgentOutput};
use crate::model::ModelProvider;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use tracing::{info, warn};

/// Named agent definitions sharing one model provider and tool registry.
///
/// Agents are built on demand. The directory is itself the dispatcher every
/// built agent uses for delegation, so sub-agents can delegate further up to
/// `max_delegation_depth`.
pub struct AgentDirectory {
    definitions: BTreeMap<String, AgentDefinition>,
    provider: Arc<dyn ModelProvider>,
    registry: Arc<ToolRegistry>,
    options: AgentOptions,
    this: Weak<AgentDirectory>,
}

impl AgentDirectory {
    pub fn new(
        definitions: impl IntoIterator<Item = AgentDefinition>,
        provider: Arc<dyn ModelProvider>,
        registry: Arc<ToolRegistry>,
        options: AgentOptions,
    ) -> Arc<Self> {
        let definitions = definitions
            .into_iter()
            .map(|definition| (definition.name.clone(), definition))
            .collect();
        Arc::new_cyclic(|this| Self {
            definitions,
            provider,
            registry,
            options,
            this: this.clone(),
        })
    }

    pub fn definition(&self, name: &str) -> Option<&AgentDefinition> {
        self.definitions.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.definitions.keys().map(String::as_str).collect()
    }

    pub fn options(&self) -> AgentOptions {
        self.options
    }

    /// Builds the named agent wired to this directory for delegation.
    pub fn build(&self, name: &str) -> Result<Agent, AgentError> {
        let definition = self
            .definitions
            .get(name)
            .ok_or_else(|| AgentError::UnknownAgent(name.to_string()))?;
        let dispatcher = self
            .this
            .upgrade()
            .map(|directory| directory as Arc<dyn AgentDispatcher>);
        let agent = Agent::new(
            definition,
            Arc::clone(&self.provider),
            Arc::clone(&self.registry),
            dispatcher,
        )?;
        Ok(agent.with_options(self.options))
    }
}

#[async_trait]
impl AgentDispatcher for AgentDirectory {
    async fn dispatch(
        &self,
        ctx: &CallContext,
        name: &str,
        history: &mut TaskHistory,
        input: AgentInput,
    ) -> Result<AgentOutput, DispatchError> {
        if !self.definitions.contains_key(name) {
            return Err(DispatchError::UnknownAgent(name.to_string()));
        }

        let child = ctx.child();
        if child.depth() > self.options.max_delegation_depth {
            warn!(agent = name, depth = child.depth(), "Delegation depth limit reached");
            return Err(DispatchError::DepthExceeded {
                name: name.to_string(),
                limit: self.options.max_delegation_depth,
            });
        }

        info!(
            agent = name,
            depth = child.depth(),
            child_session = %input.child_session_key,
            "Delegating to sub-agent"
        );
        let agent = self.build(name)?;
        Ok(agent.run(&child, history, input).await?)
    }
}
