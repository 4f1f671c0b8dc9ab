//! Error types for the rollout engine.

use fleetroll_compute::ComputeError;
use thiserror::Error;

/// Result type alias for rollout operations.
pub type RolloutResult<T> = Result<T, RolloutError>;

/// Errors that can abort a rollout run.
///
/// Every variant is terminal for the run: the fleet stays in its last
/// successfully reached state and nothing is rolled back.
#[derive(Debug, Error)]
pub enum RolloutError {
    /// No visible image name contains the requested identifier.
    #[error("no image matches identifier {0:?}")]
    NoMatchingImage(String),

    /// The template named as the clone source does not exist.
    #[error("no instance template named {0:?} to clone")]
    MissingReferenceTemplate(String),

    /// A request field failed up-front validation.
    #[error("invalid rollout request: {0}")]
    InvalidRequest(String),

    /// The single-instance production guard tripped. Never retried, and
    /// raised before any instance replacement; the binary maps this to
    /// its own exit code.
    #[error("production safety guard: {0}")]
    ProductionGuard(String),

    /// Underlying provider failure, propagated unchanged (after any
    /// bounded retries were already spent).
    #[error(transparent)]
    Compute(#[from] ComputeError),
}
