//! Session persistence for ensemble agents.
//!
//! A session is a sequence of tasks per agent. [`SessionManager`] resumes the
//! task in progress or rolls over to a new one after completion, and persists
//! each record through a [`TaskStore`].

mod error;
mod file;
mod manager;
mod memory;
mod store;

pub use error::{SessionError, StoreError};
pub use file::FileTaskStore;
pub use manager::{SessionManager, TurnOutcome};
pub use memory::MemoryTaskStore;
pub use store::TaskStore;
