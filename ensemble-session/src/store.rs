use crate::error::StoreError;
use async_trait::async_trait;
use ensemble_core::history::{LatestTask, TaskHistory};
use std::path::Path;

/// Persistence for task records and the per-agent latest-task pointer.
///
/// Records are scoped by session key and agent name. Missing records are
/// `Ok(None)`, never an error.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn load_task(
        &self,
        session: &str,
        agent: &str,
        task_id: i64,
    ) -> Result<Option<TaskHistory>, StoreError>;

    async fn save_task(
        &self,
        session: &str,
        agent: &str,
        history: &TaskHistory,
    ) -> Result<(), StoreError>;

    async fn load_latest(&self, session: &str, agent: &str)
    -> Result<Option<LatestTask>, StoreError>;

    async fn save_latest(
        &self,
        session: &str,
        agent: &str,
        latest: &LatestTask,
    ) -> Result<(), StoreError>;
}

/// Session and agent names become store path segments: empty names, dot
/// segments, separators and absolute paths are rejected.
pub(crate) fn key_component<'a>(kind: &'static str, value: &'a str) -> Result<&'a str, StoreError> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0'])
        || Path::new(value).is_absolute();
    if invalid {
        return Err(StoreError::InvalidKey {
            kind,
            value: value.to_string(),
        });
    }
    Ok(value)
}
