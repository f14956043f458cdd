//! Tools shipped with the core and preloaded by
//! [`ToolRegistry::with_inbuilt_tools`](crate::tooling::ToolRegistry::with_inbuilt_tools).

mod current_time;

pub use current_time::{CurrentTimeInput, CurrentTimeOutput, CurrentTimeTool};
