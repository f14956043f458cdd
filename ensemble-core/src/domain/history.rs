//! Task history model.
//!
//! A [`TaskHistory`] is the persisted transcript of one task attempt. The
//! transcript only grows: the type exposes append operations and read access
//! but no way to edit or drop a turn. Sub-agents get their own nested history
//! under [`TaskHistory::agents_history`], and a task started after a completed
//! one can see that task's turns through a read-only back-reference that is
//! never persisted.

use super::types::{ChatMessage, TokenStats};
use crate::constants::TASK_ID_WIDTH;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Parses the text a model put inside `<task_status>`.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().trim_matches('"').to_ascii_lowercase();
        match normalized.as_str() {
            "in_progress" | "in-progress" | "inprogress" => Some(TaskStatus::InProgress),
            "completed" | "complete" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders a numeric task id as the fixed width key used by stores.
pub fn format_task_id(task_id: i64) -> String {
    format!("{task_id:0width$}", width = TASK_ID_WIDTH)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHistory {
    #[serde(default)]
    id: String,
    #[serde(default)]
    task_id: i64,
    #[serde(default)]
    contents: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub stats: TokenStats,
    #[serde(default)]
    agents_history: BTreeMap<String, TaskHistory>,
    #[serde(skip)]
    previous_task: Option<Arc<TaskHistory>>,
}

impl TaskHistory {
    /// Empty history without an id, used for lazily created sub-agent histories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh in-progress record for the given task sequence number.
    pub fn for_task(task_id: i64) -> Self {
        Self {
            id: format_task_id(task_id),
            task_id,
            status: Some(TaskStatus::InProgress),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn task_id(&self) -> i64 {
        self.task_id
    }

    pub fn contents(&self) -> &[ChatMessage] {
        &self.contents
    }

    pub fn is_completed(&self) -> bool {
        self.status == Some(TaskStatus::Completed)
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.contents.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.contents.push(ChatMessage::assistant(content));
    }

    /// Attaches the previous task of the same session. Only the first call
    /// has an effect; the reference is fixed for the lifetime of the record.
    pub fn set_previous_task(&mut self, previous: Arc<TaskHistory>) {
        if self.previous_task.is_none() {
            self.previous_task = Some(previous);
        }
    }

    pub fn previous_task(&self) -> Option<&TaskHistory> {
        self.previous_task.as_deref()
    }

    /// Transcript sent to the model: the previous task's turns followed by
    /// this task's turns.
    pub fn transcript(&self) -> Vec<ChatMessage> {
        let previous = self
            .previous_task
            .as_deref()
            .map(TaskHistory::contents)
            .unwrap_or_default();
        previous.iter().chain(self.contents.iter()).cloned().collect()
    }

    pub fn agents_history(&self) -> &BTreeMap<String, TaskHistory> {
        &self.agents_history
    }

    pub fn agent_history(&self, name: &str) -> Option<&TaskHistory> {
        self.agents_history.get(name)
    }

    /// Sub-agent history for `name`, created on first use.
    pub fn agent_history_mut(&mut self, name: &str) -> &mut TaskHistory {
        self.agents_history.entry(name.to_string()).or_default()
    }
}

/// Pointer record a session keeps to find its current and last finished task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestTask {
    pub id: String,
    #[serde(default)]
    pub current_task_id: i64,
    #[serde(default)]
    pub last_completed_task_id: i64,
}
