//! Error types for the compute-provider surface.

use thiserror::Error;

/// Result type alias for provider operations.
pub type ComputeResult<T> = Result<T, ComputeError>;

/// Errors surfaced by a [`crate::ComputeClient`] implementation.
#[derive(Debug, Error)]
pub enum ComputeError {
    /// A named resource lookup came back empty. Terminal; retrying a
    /// lookup that found nothing cannot change the outcome.
    #[error("{0} not found")]
    NotFound(String),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a provider answer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
