//! Model infrastructure module
//!
//! # Structure
//! - `types` - Request, Response, Error types
//! - `traits` - ModelProvider trait
//! - `factory` - Provider factory for creating clients from config
//! - `clients` - Individual client implementations

#[cfg(feature = "http-providers")]
pub mod clients;
#[cfg(feature = "http-providers")]
pub mod factory;
pub mod traits;
pub mod types;

#[cfg(feature = "http-providers")]
pub use factory::create_provider;
pub use traits::ModelProvider;
pub use types::{GenerateRequest, GenerateResponse, ModelError};
