//! Error types for the shared cube data model.

use thiserror::Error;

/// Result type alias using CubeDataError.
pub type CubeResult<T> = Result<T, CubeDataError>;

/// Errors raised when cube data or its coordinates are malformed.
#[derive(Debug, Error)]
pub enum CubeDataError {
    #[error("Invalid time interval: {0}")]
    InvalidInterval(String),

    #[error("Variable '{name}' has {actual} values, expected {expected}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Variable '{0}' needs a time axis but the cube has none")]
    MissingTimeAxis(String),

    #[error("Axis '{0}' is empty or not strictly monotonic")]
    InvalidAxis(String),

    #[error("Duplicate variable name: {0}")]
    DuplicateVariable(String),

    #[error("Unknown interpolation policy: {0}")]
    UnknownPolicy(String),
}
