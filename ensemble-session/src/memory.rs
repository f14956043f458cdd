use crate::error::StoreError;
use crate::store::{TaskStore, key_component};
use async_trait::async_trait;
use ensemble_core::history::{LatestTask, TaskHistory, format_task_id};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// In-process store. Records are kept as JSON so a load returns what a
/// persistent store would: no previous-task link, no shared state.
#[derive(Default)]
pub struct MemoryTaskStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    async fn get<T: DeserializeOwned>(&self, key: String) -> Result<Option<T>, StoreError> {
        let records = self.records.lock().await;
        records
            .get(&key)
            .map(|raw| {
                serde_json::from_str(raw).map_err(|source| StoreError::Serialization {
                    key: key.clone(),
                    source,
                })
            })
            .transpose()
    }

    async fn put<T: Serialize + Sync>(&self, key: String, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialization {
            key: key.clone(),
            source,
        })?;
        self.records.lock().await.insert(key, raw);
        Ok(())
    }
}

fn agent_key(session: &str, agent: &str) -> Result<String, StoreError> {
    Ok(format!(
        "{}/{}",
        key_component("session", session)?,
        key_component("agent", agent)?
    ))
}

fn task_key(session: &str, agent: &str, task_id: i64) -> Result<String, StoreError> {
    Ok(format!("{}/{}", agent_key(session, agent)?, format_task_id(task_id)))
}

fn latest_key(session: &str, agent: &str) -> Result<String, StoreError> {
    Ok(format!("{}/latest", agent_key(session, agent)?))
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn load_task(
        &self,
        session: &str,
        agent: &str,
        task_id: i64,
    ) -> Result<Option<TaskHistory>, StoreError> {
        self.get(task_key(session, agent, task_id)?).await
    }

    async fn save_task(
        &self,
        session: &str,
        agent: &str,
        history: &TaskHistory,
    ) -> Result<(), StoreError> {
        self.put(task_key(session, agent, history.task_id())?, history)
            .await
    }

    async fn load_latest(
        &self,
        session: &str,
        agent: &str,
    ) -> Result<Option<LatestTask>, StoreError> {
        self.get(latest_key(session, agent)?).await
    }

    async fn save_latest(
        &self,
        session: &str,
        agent: &str,
        latest: &LatestTask,
    ) -> Result<(), StoreError> {
        self.put(latest_key(session, agent)?, latest).await
    }
}
