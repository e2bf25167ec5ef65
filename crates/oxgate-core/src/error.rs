//! Error types for the oxgate core.

/// Core error type for oxgate infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum OxgateError {
    /// An action with the same request id is already in flight.
    #[error("duplicate request id: {0}")]
    DuplicateRequest(String),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for oxgate operations.
pub type OxgateResult<T> = Result<T, OxgateError>;
