use crate::error::StoreError;
use crate::store::{TaskStore, key_component};
use async_trait::async_trait;
use ensemble_core::history::{LatestTask, TaskHistory, format_task_id};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const LATEST_FILE: &str = "latest.json";

/// JSON files on disk:
///
/// ```text
/// <root>/<session>/<agent>/<task id>.json
/// <root>/<session>/<agent>/latest.json
/// ```
#[derive(Debug, Clone)]
pub struct FileTaskStore {
    root: PathBuf,
}

impl FileTaskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn agent_dir(&self, session: &str, agent: &str) -> Result<PathBuf, StoreError> {
        Ok(self
            .root
            .join(key_component("session", session)?)
            .join(key_component("agent", agent)?))
    }

    fn task_path(&self, session: &str, agent: &str, task_id: i64) -> Result<PathBuf, StoreError> {
        Ok(self
            .agent_dir(session, agent)?
            .join(format!("{}.json", format_task_id(task_id))))
    }

    fn latest_path(&self, session: &str, agent: &str) -> Result<PathBuf, StoreError> {
        Ok(self.agent_dir(session, agent)?.join(LATEST_FILE))
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let raw = match fs::read(path).await {
        Ok(raw) => raw,
        Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|source| StoreError::Serialization {
            key: path.display().to_string(),
            source,
        })
}

/// Writes through a sibling temp file and a rename so readers never see a
/// partial record.
async fn write_json<T: Serialize + Sync>(path: &Path, value: &T) -> Result<(), StoreError> {
    let raw = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialization {
        key: path.display().to_string(),
        source,
    })?;
    let io_error = |source: io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, raw).await.map_err(io_error)?;
    fs::rename(&staging, path).await.map_err(io_error)?;
    debug!(path = %path.display(), "Record written");
    Ok(())
}

#[async_trait]
impl TaskStore for FileTaskStore {
    async fn load_task(
        &self,
        session: &str,
        agent: &str,
        task_id: i64,
    ) -> Result<Option<TaskHistory>, StoreError> {
        read_json(&self.task_path(session, agent, task_id)?).await
    }

    async fn save_task(
        &self,
        session: &str,
        agent: &str,
        history: &TaskHistory,
    ) -> Result<(), StoreError> {
        write_json(&self.task_path(session, agent, history.task_id())?, history).await
    }

    async fn load_latest(
        &self,
        session: &str,
        agent: &str,
    ) -> Result<Option<LatestTask>, StoreError> {
        read_json(&self.latest_path(session, agent)?).await
    }

    async fn save_latest(
        &self,
        session: &str,
        agent: &str,
        latest: &LatestTask,
    ) -> Result<(), StoreError> {
        write_json(&self.latest_path(session, agent)?, latest).await
    }
}
