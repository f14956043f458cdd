use super::CallRuntime;
use crate::domain::calls::{CallOutcome, CallRequest};
use crate::domain::context::CallContext;
use crate::domain::history::TaskHistory;
use tracing::{debug, info, warn};

impl CallRuntime {
    /// Runs `calls` one at a time in the order given.
    ///
    /// Unknown names and failed invocations never abort the turn: their
    /// message becomes the outcome text the model sees.
    pub(crate) async fn perform_all(
        &self,
        ctx: &CallContext,
        history: &mut TaskHistory,
        session_key: &str,
        calls: impl IntoIterator<Item = CallRequest>,
    ) -> Vec<CallOutcome> {
        let mut outcomes = Vec::new();
        for call in calls {
            outcomes.push(self.perform(ctx, history, session_key, &call).await);
        }
        outcomes
    }

    async fn perform(
        &self,
        ctx: &CallContext,
        history: &mut TaskHistory,
        session_key: &str,
        call: &CallRequest,
    ) -> CallOutcome {
        let kind = call.kind();
        let name = call.name();
        info!(kind, name, task_id = history.id(), "Dispatching call");
        if let CallRequest::Agent(agent_call) = call {
            history.agent_history_mut(&agent_call.name);
        }

        let output = match self.catalog.resolve(call) {
            None => {
                warn!(kind, name, "Model requested an unregistered capability");
                call.not_found_message()
            }
            Some(resolved) => match resolved.invoke(ctx, history, session_key).await {
                Ok(output) => {
                    debug!(kind, name, bytes = output.len(), "Call completed");
                    output
                }
                Err(err) => {
                    warn!(kind, name, error = %err, "Call failed");
                    err.to_string()
                }
            },
        };

        CallOutcome {
            name: name.to_string(),
            output,
        }
    }
}
