mod execution;
pub mod instructions;
pub mod parser;

use crate::application::tooling::CapabilityCatalog;
use std::collections::HashMap;

/// Per-agent call machinery: the capability catalog plus prompt assembly
/// and call execution over it.
pub(crate) struct CallRuntime {
    catalog: CapabilityCatalog,
}

impl CallRuntime {
    pub(crate) fn new(catalog: CapabilityCatalog) -> Self {
        Self { catalog }
    }

    pub(crate) fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }

    pub(crate) fn system_prompt(
        &self,
        agent_context: &str,
        labels: &HashMap<String, String>,
    ) -> Result<String, serde_json::Error> {
        instructions::compose_system_prompt(
            agent_context,
            labels,
            &self.catalog.list_tool_descriptors(),
            &self.catalog.list_agent_descriptors(),
        )
    }
}
