//! Model traits

use super::types::{GenerateRequest, GenerateResponse, ModelError};
use crate::domain::context::CallContext;
use async_trait::async_trait;

/// Text generation backend consumed by the turn loop.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider identifier used in logs.
    fn id(&self) -> &str;

    /// Generate a reply for the given system prompt, ordered history and new input.
    async fn generate(
        &self,
        ctx: &CallContext,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, ModelError>;
}
