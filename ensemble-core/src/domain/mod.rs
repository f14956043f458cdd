pub mod calls;
pub mod context;
pub mod history;
pub mod types;
