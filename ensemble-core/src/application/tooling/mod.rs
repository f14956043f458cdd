//! Capability catalog: tool executors, sub-agent capabilities and the
//! registry inbuilt tools are resolved from.

mod catalog;
mod descriptor;
mod error;
mod inbuilt;
mod interface;
mod registry;
mod remote;

pub use catalog::{AgentCapability, CallError, CapabilityCatalog, ResolvedCall};
pub use descriptor::{AgentDescriptor, ToolDescriptor};
pub use error::{CatalogError, DispatchError, SchemaError, ToolFailure, ToolInvokeError};
pub use inbuilt::{InbuiltTool, InbuiltToolAdapter};
pub use interface::{AgentDispatcher, ToolExecutor};
pub use registry::ToolRegistry;
pub use remote::RemoteToolExecutor;
