//! Error types for the minicuber crate.

use cube_common::{CubeDataError, TimeInterval};
use thiserror::Error;

/// Errors that abort a cube build.
#[derive(Error, Debug)]
pub enum MinicuberError {
    /// Invalid specification or tunables. Raised before any provider I/O.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Grid planning failed, e.g. no UTM zone for the center point.
    #[error("Grid planning failed: {0}")]
    Grid(#[from] projection::ProjectionError),

    #[error("Malformed cube data: {0}")]
    CubeData(#[from] CubeDataError),

    #[error("Failed to parse specification: {0}")]
    Parse(String),

    /// A fatal failure annotated with the build that raised it.
    #[error("Build at lon={}, lat={} for {interval} failed: {source}", .location.0, .location.1)]
    Build {
        location: (f64, f64),
        interval: TimeInterval,
        #[source]
        source: Box<MinicuberError>,
    },
}

impl MinicuberError {
    /// Attach the location and interval of a build to this error.
    pub fn in_build(self, location: (f64, f64), interval: TimeInterval) -> Self {
        match self {
            already @ MinicuberError::Build { .. } => already,
            other => MinicuberError::Build {
                location,
                interval,
                source: Box::new(other),
            },
        }
    }

    pub fn is_config(&self) -> bool {
        match self {
            MinicuberError::Config(_) | MinicuberError::Parse(_) => true,
            MinicuberError::Build { source, .. } => source.is_config(),
            _ => false,
        }
    }
}

/// Result type for minicuber operations.
pub type Result<T> = std::result::Result<T, MinicuberError>;

/// Errors returned by a provider's `load_data`.
///
/// Contained by the assembler: they never abort a build.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Timeouts, rate limits and other conditions worth retrying.
    #[error("Transient provider failure: {0}")]
    Transient(String),

    /// Terminal for this call.
    #[error("Provider failed: {0}")]
    Failed(String),

    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}
