//! Error types for the keep-alive responder.

use thiserror::Error;

/// Boxed cause carried by a faulted operation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for responder runs.
pub type KeepAliveResult<T> = Result<T, KeepAliveError>;

/// Fatal outcomes raised once the heartbeat loop has exited.
#[derive(Debug, Error)]
pub enum KeepAliveError {
    /// The operation stopped without producing a result (its task was cancelled).
    #[error("process did not complete")]
    OperationIncomplete,

    /// The operation returned an error or panicked; carries the cause.
    #[error("process failed: {0}")]
    OperationFaulted(#[source] BoxError),
}

/// Errors from parsing keep-alive configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),

    #[error("heartbeat interval must be greater than zero")]
    ZeroInterval,
}
