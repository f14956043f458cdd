use super::descriptor::ToolDescriptor;
use super::error::ToolInvokeError;
use super::interface::ToolExecutor;
use crate::domain::context::CallContext;
use async_trait::async_trait;
use tracing::warn;

/// Externally hosted tool known only by its descriptor.
///
/// Reaching the hosting service is not wired up; calls fail with
/// [`ToolInvokeError::RemoteUnavailable`], which the turn loop feeds back to
/// the model as ordinary text.
pub struct RemoteToolExecutor {
    descriptor: ToolDescriptor,
}

impl RemoteToolExecutor {
    pub fn new(mut descriptor: ToolDescriptor) -> Self {
        descriptor.inbuilt = false;
        Self { descriptor }
    }
}

#[async_trait]
impl ToolExecutor for RemoteToolExecutor {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, _ctx: &CallContext, _input: &str) -> Result<String, ToolInvokeError> {
        warn!(
            tool = %self.descriptor.name,
            service = %self.descriptor.service_name,
            "Remote tool invoked but no remote transport is configured"
        );
        Err(ToolInvokeError::RemoteUnavailable {
            tool: self.descriptor.name.clone(),
            service: self.descriptor.service_name.clone(),
        })
    }
}
