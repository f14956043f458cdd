mod directive;
mod directory;
mod errors;
mod models;
mod runner;
mod runtime;

#[cfg(test)]
mod tests;

pub use directory::AgentDirectory;
pub use errors::AgentError;
pub use models::{AgentDefinition, AgentOptions, ToolSpec};
pub use runner::Agent;
pub use runtime::instructions::{compose_system_prompt, replace_labels};
pub use runtime::parser as codec;
pub use runtime::parser::CodecError;
