//! TOML configuration: model provider, loop limits and agent definitions.

pub mod agent;
pub mod app;
pub mod error;
pub mod loader;
pub mod provider;

pub use agent::RawTool;
pub use app::AppConfig;
pub use error::ConfigError;
pub use loader::ensure_env_loaded;
pub use provider::ProviderConfig;
