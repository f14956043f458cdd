//! Orchestration core for tool- and agent-calling language model agents.
//!
//! An [`Agent`](application::agent::Agent) converses with a
//! [`ModelProvider`](infrastructure::model::ModelProvider), lets the model
//! request tool invocations or sub-agent delegation through a tag based call
//! grammar, executes them and folds the results back into the
//! [`TaskHistory`](domain::history::TaskHistory) until the model produces a
//! terminal `<response>` / `<task_status>` pair.

pub mod application;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, tooling};
pub use domain::{history, types};
pub use infrastructure::{model, tools};
