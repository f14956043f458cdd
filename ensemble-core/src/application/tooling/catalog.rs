//! Name-keyed tool and sub-agent capabilities of one agent.

use super::descriptor::{AgentDescriptor, ToolDescriptor};
use super::error::{CatalogError, DispatchError, ToolInvokeError};
use super::interface::{AgentDispatcher, ToolExecutor};
use super::registry::ToolRegistry;
use super::remote::RemoteToolExecutor;
use crate::domain::calls::{AgentCall, CallRequest, ToolCall};
use crate::domain::context::CallContext;
use crate::domain::history::TaskHistory;
use crate::domain::types::{AgentInput, AgentOutput};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// A sub-agent bound to the host's dispatch function.
#[derive(Clone)]
pub struct AgentCapability {
    descriptor: AgentDescriptor,
    dispatcher: Arc<dyn AgentDispatcher>,
}

impl AgentCapability {
    pub fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    pub async fn execute(
        &self,
        ctx: &CallContext,
        history: &mut TaskHistory,
        input: AgentInput,
    ) -> Result<AgentOutput, DispatchError> {
        self.dispatcher
            .dispatch(ctx, &self.descriptor.name, history, input)
            .await
    }
}

pub struct CapabilityCatalog {
    registry: Arc<ToolRegistry>,
    dispatcher: Option<Arc<dyn AgentDispatcher>>,
    tools: BTreeMap<String, Arc<dyn ToolExecutor>>,
    agents: BTreeMap<String, AgentCapability>,
}

impl CapabilityCatalog {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            dispatcher: None,
            tools: BTreeMap::new(),
            agents: BTreeMap::new(),
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn AgentDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Registers an inbuilt tool from the shared registry.
    pub fn register_tool(&mut self, name: &str) -> Result<(), CatalogError> {
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| CatalogError::UnknownTool(name.to_string()))?;
        debug!(tool = name, "Tool added to catalog");
        self.tools.insert(tool.name().to_string(), tool);
        Ok(())
    }

    /// Registers a tool hosted outside this process.
    pub fn register_remote_tool(&mut self, descriptor: ToolDescriptor) {
        debug!(tool = %descriptor.name, service = %descriptor.service_name, "Remote tool added to catalog");
        self.tools.insert(
            descriptor.name.clone(),
            Arc::new(RemoteToolExecutor::new(descriptor)),
        );
    }

    pub fn register_agent(&mut self, descriptor: AgentDescriptor) -> Result<(), CatalogError> {
        let dispatcher = self
            .dispatcher
            .clone()
            .ok_or_else(|| CatalogError::MissingDispatcher(descriptor.name.clone()))?;
        debug!(agent = %descriptor.name, "Agent added to catalog");
        self.agents.insert(
            descriptor.name.clone(),
            AgentCapability {
                descriptor,
                dispatcher,
            },
        );
        Ok(())
    }

    pub fn list_tool_descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .values()
            .map(|tool| tool.descriptor().clone())
            .collect()
    }

    pub fn list_agent_descriptors(&self) -> Vec<AgentDescriptor> {
        self.agents
            .values()
            .map(|agent| agent.descriptor.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty() && self.agents.is_empty()
    }

    pub fn get_tool(&self, name: &str) -> Option<&Arc<dyn ToolExecutor>> {
        self.tools.get(name)
    }

    pub fn get_agent(&self, name: &str) -> Option<&AgentCapability> {
        self.agents.get(name)
    }

    /// Pairs a parsed call with the capability able to serve it.
    pub fn resolve<'a>(&'a self, call: &'a CallRequest) -> Option<ResolvedCall<'a>> {
        match call {
            CallRequest::Tool(call) => self
                .get_tool(&call.name)
                .map(|executor| ResolvedCall::Tool { executor, call }),
            CallRequest::Agent(call) => self
                .get_agent(&call.name)
                .map(|capability| ResolvedCall::Agent { capability, call }),
        }
    }
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Tool(#[from] ToolInvokeError),
    #[error(transparent)]
    Agent(#[from] DispatchError),
    #[error("failed to encode parameters for tool {tool}: {source}")]
    Parameters {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A call together with the capability that serves it.
pub enum ResolvedCall<'a> {
    Tool {
        executor: &'a Arc<dyn ToolExecutor>,
        call: &'a ToolCall,
    },
    Agent {
        capability: &'a AgentCapability,
        call: &'a AgentCall,
    },
}

impl ResolvedCall<'_> {
    /// Runs the call and returns its output text.
    ///
    /// Agent calls run against the caller's sub-history for that agent,
    /// created on first use. `session_key` is forwarded and the delegating
    /// task's id becomes the child session key.
    pub async fn invoke(
        &self,
        ctx: &CallContext,
        history: &mut TaskHistory,
        session_key: &str,
    ) -> Result<String, CallError> {
        match self {
            ResolvedCall::Tool { executor, call } => {
                let input = serde_json::to_string(&call.parameters).map_err(|source| {
                    CallError::Parameters {
                        tool: call.name.clone(),
                        source,
                    }
                })?;
                Ok(executor.execute(ctx, &input).await?)
            }
            ResolvedCall::Agent { capability, call } => {
                let input = AgentInput {
                    session_key: session_key.to_string(),
                    child_session_key: history.id().to_string(),
                    text: call.input.clone(),
                    ..AgentInput::default()
                };
                let sub_history = history.agent_history_mut(&call.name);
                let output = capability.execute(ctx, sub_history, input).await?;
                Ok(output.text)
            }
        }
    }
}
