//! Provider interfaces for text and image generation.

use async_trait::async_trait;
use thiserror::Error;

use crate::artifact::ImagePayload;

/// Failures from an upstream generation provider. Retryable by the user;
/// never refunds an already-charged reservation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider could not be reached.
    #[error("provider unreachable: {0}")]
    Network(String),

    /// The provider throttled the request.
    #[error("provider rate limited")]
    RateLimited,

    /// The provider answered with a non-success status or an unusable body.
    #[error("provider request failed: {0}")]
    Failed(String),

    /// The provider answered successfully but with no content.
    #[error("provider returned an empty response")]
    Empty,
}

/// A text-generation capability. Calls may suspend for seconds.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Produces a completion for the given system/user prompt pair.
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}

/// An image-generation capability, independent of the text provider.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Renders one image for a short prompt.
    async fn render(&self, prompt: &str) -> Result<ImagePayload, ProviderError>;
}
