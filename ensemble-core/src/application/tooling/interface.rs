use super::descriptor::ToolDescriptor;
use super::error::{DispatchError, ToolInvokeError};
use crate::domain::context::CallContext;
use crate::domain::history::TaskHistory;
use crate::domain::types::{AgentInput, AgentOutput};
use async_trait::async_trait;

/// Uniform tool contract: JSON text in, JSON text out.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    fn descriptor(&self) -> &ToolDescriptor;

    fn name(&self) -> &str {
        &self.descriptor().name
    }

    async fn execute(&self, ctx: &CallContext, input: &str) -> Result<String, ToolInvokeError>;
}

/// Executes a delegated sub-agent call. Supplied by the host, which owns how
/// sub-agents are located and invoked.
#[async_trait]
pub trait AgentDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        ctx: &CallContext,
        name: &str,
        history: &mut TaskHistory,
        input: AgentInput,
    ) -> Result<AgentOutput, DispatchError>;
}
