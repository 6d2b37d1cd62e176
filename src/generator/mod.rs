//! Seam to the external text-generation service.
//!
//! The service is treated as opaque: it takes a prompt and returns one string.
//! Concrete network clients live outside this crate; [`StaticGenerator`] stands
//! in for them in tests and in the CLI replay mode.

mod fake;
mod retry;

pub use fake::StaticGenerator;
pub use retry::RetryingGenerator;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for generation calls.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    RequestFailed(String),

    #[error("Generation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Generation service returned an empty response")]
    EmptyResponse,

    #[error("Generation service not configured: {0}")]
    NotConfigured(String),
}

/// Unified trait for text-generation services
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send a prompt and get the service's text reply.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Get the provider name (e.g., "gemini", "static")
    fn provider_name(&self) -> &str;

    /// Get the model name recorded with each generation
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for std::sync::Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
