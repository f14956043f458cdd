use super::error::SchemaError;
use super::inbuilt::{InbuiltTool, InbuiltToolAdapter};
use super::interface::ToolExecutor;
use crate::infrastructure::tools::CurrentTimeTool;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Process-wide set of tools agents may register by name.
///
/// Built once at start-up and shared by `Arc` with every agent builder.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolExecutor>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the tools shipped in this crate.
    pub fn with_inbuilt_tools() -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        registry.register_inbuilt(CurrentTimeTool)?;
        Ok(registry)
    }

    pub fn register(&mut self, executor: Arc<dyn ToolExecutor>) {
        let name = executor.name().to_string();
        debug!(tool = %name, "Registering tool");
        self.tools.insert(name, executor);
    }

    pub fn register_inbuilt<T: InbuiltTool>(&mut self, tool: T) -> Result<(), SchemaError> {
        let adapter = InbuiltToolAdapter::new(tool)?;
        self.register(Arc::new(adapter));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolExecutor>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }
}
