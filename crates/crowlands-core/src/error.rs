//! Domain error types.

use thiserror::Error;

/// Storage-facing error taxonomy shared by every store in the workspace.
///
/// Policy outcomes (a denied quota reservation, an unparsable provider
/// response) are NOT errors and are modeled as enum variants on the
/// operations that produce them; this type covers the cases where an
/// operation could not be carried out at all.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The input failed domain validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error. Retryable by the caller.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Wraps a storage-layer failure, preserving its message.
    pub fn infrastructure(err: impl std::fmt::Display) -> Self {
        Self::Infrastructure(err.to_string())
    }
}
