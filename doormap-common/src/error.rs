//! Common error types for doormap

use thiserror::Error;

/// Common result type for doormap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across doormap services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Coordinate outside the valid latitude/longitude ranges
    #[error("Invalid coordinate: lat={lat}, long={long} (lat must be in [-90,90], long in [-180,180])")]
    InvalidCoordinate { lat: f64, long: f64 },

    /// Declared door count disagrees with the supplied labels
    #[error("Door count mismatch: declared {declared} doors but info text contains {actual} labels")]
    CountMismatch { declared: usize, actual: usize },

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors caused by bad caller input rather than server state
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidCoordinate { .. } | Error::CountMismatch { .. } | Error::InvalidInput(_)
        )
    }
}
