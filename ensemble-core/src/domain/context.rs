use tokio_util::sync::CancellationToken;

/// Per-call context threaded through model, tool and sub-agent invocations.
///
/// Cancellation is cooperative: the token is handed to every capability and
/// the turn loop checks it between rounds. `depth` counts nested agent
/// delegations.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancellation: CancellationToken,
    depth: usize,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            depth: 0,
        }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Context for a delegated sub-agent run. Shares the cancellation token.
    pub fn child(&self) -> Self {
        Self {
            cancellation: self.cancellation.clone(),
            depth: self.depth + 1,
        }
    }
}
