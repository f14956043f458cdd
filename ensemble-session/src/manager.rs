use crate::error::SessionError;
use crate::store::TaskStore;
use ensemble_core::agent::Agent;
use ensemble_core::domain::context::CallContext;
use ensemble_core::history::{LatestTask, TaskHistory, TaskStatus};
use ensemble_core::types::{AgentInput, AgentOutput};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

const LATEST_POINTER_ID: &str = "latest";

/// Result of one committed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub task_id: i64,
    pub status: TaskStatus,
    pub output: AgentOutput,
}

/// Loads, runs and commits task records for sessions.
///
/// Runs for the same session key are serialized; different sessions proceed
/// independently.
pub struct SessionManager {
    store: Arc<dyn TaskStore>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    /// Loads the record a turn should run against.
    ///
    /// With an explicit id the record is loaded as is, or created fresh.
    /// Without one the latest pointer decides: resume the current task, or
    /// start the next one with the last completed task attached as context.
    pub async fn load_task(
        &self,
        session: &str,
        agent: &str,
        task_id: Option<i64>,
    ) -> Result<TaskHistory, SessionError> {
        if let Some(task_id) = task_id.filter(|id| *id > 0) {
            let history = self
                .store
                .load_task(session, agent, task_id)
                .await?
                .unwrap_or_else(|| TaskHistory::for_task(task_id));
            debug!(session, agent, task_id, "Loaded task by id");
            return Ok(history);
        }

        let latest = self
            .store
            .load_latest(session, agent)
            .await?
            .unwrap_or_default();

        let previous = if latest.last_completed_task_id > 0 {
            self.store
                .load_task(session, agent, latest.last_completed_task_id)
                .await?
                .map(Arc::new)
        } else {
            None
        };

        let resumed = if latest.current_task_id > 0 {
            self.store
                .load_task(session, agent, latest.current_task_id)
                .await?
        } else {
            None
        };

        let mut history = match resumed {
            Some(history) => {
                debug!(session, agent, task_id = history.task_id(), "Resuming task in progress");
                history
            }
            None => {
                let next = latest.current_task_id.max(latest.last_completed_task_id) + 1;
                debug!(session, agent, task_id = next, "Starting new task");
                TaskHistory::for_task(next)
            }
        };
        if let Some(previous) = previous {
            history.set_previous_task(previous);
        }
        Ok(history)
    }

    /// Persists `history`. Unless the task was addressed explicitly, the
    /// latest pointer moves with it.
    pub async fn commit(
        &self,
        session: &str,
        agent: &str,
        history: &TaskHistory,
        explicit: bool,
    ) -> Result<(), SessionError> {
        self.store.save_task(session, agent, history).await?;
        if explicit {
            return Ok(());
        }

        let latest = if history.is_completed() {
            LatestTask {
                id: LATEST_POINTER_ID.to_string(),
                current_task_id: 0,
                last_completed_task_id: history.task_id(),
            }
        } else {
            LatestTask {
                id: LATEST_POINTER_ID.to_string(),
                current_task_id: history.task_id(),
                last_completed_task_id: history
                    .previous_task()
                    .map(TaskHistory::task_id)
                    .unwrap_or(0),
            }
        };
        self.store.save_latest(session, agent, &latest).await?;
        Ok(())
    }

    /// Runs one user turn for `input.session_key` under the session lock.
    ///
    /// A failed run persists nothing.
    pub async fn run_turn(
        &self,
        ctx: &CallContext,
        agent: &Agent,
        input: AgentInput,
        task_id: Option<i64>,
    ) -> Result<TurnOutcome, SessionError> {
        let session = input.session_key.trim().to_string();
        if session.is_empty() {
            return Err(SessionError::MissingSessionKey);
        }

        let lock = self.session_lock(&session).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.locked_turn(ctx, agent, &session, input, task_id).await
        };
        self.release_session_lock(&session, lock).await;
        outcome
    }

    async fn locked_turn(
        &self,
        ctx: &CallContext,
        agent: &Agent,
        session: &str,
        input: AgentInput,
        task_id: Option<i64>,
    ) -> Result<TurnOutcome, SessionError> {
        let explicit = task_id.is_some_and(|id| id > 0);
        let mut history = self.load_task(session, agent.name(), task_id).await?;
        info!(session, agent = agent.name(), task_id = history.task_id(), "Running session turn");

        let output = agent.run(ctx, &mut history, input).await?;
        self.commit(session, agent.name(), &history, explicit).await?;

        Ok(TurnOutcome {
            task_id: history.task_id(),
            status: history.status.unwrap_or(TaskStatus::InProgress),
            output,
        })
    }

    async fn session_lock(&self, session: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(session.to_string()).or_default())
    }

    /// Drops the map entry once no other turn holds or waits on it.
    async fn release_session_lock(&self, session: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        // One reference in the map plus `lock` itself.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(session);
        }
    }
}
