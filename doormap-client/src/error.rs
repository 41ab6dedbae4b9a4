//! Client error types

use thiserror::Error;

/// Result type for doormap-client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised by the read-side client
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// No candidate endpoint produced a usable record
    #[error("Not found: {0}")]
    NotFound(String),

    /// Edit-session command applied in the wrong state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Local draft validation failed; save was not attempted
    #[error("Validation failed: {0}")]
    Validation(String),
}
