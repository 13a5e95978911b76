//! Error types for coordinate transformations.

use thiserror::Error;

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;

#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The point lies outside every UTM zone's area of use.
    #[error("no UTM zone covers lon={lon}, lat={lat}")]
    NoUtmZone { lon: f64, lat: f64 },

    #[error("non-finite coordinate lon={lon}, lat={lat}")]
    NonFinite { lon: f64, lat: f64 },

    #[error("unsupported EPSG code: {0}")]
    UnsupportedEpsg(u32),
}
