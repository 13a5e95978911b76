//! Error types for regridding.

use cube_common::CubeDataError;
use projection::ProjectionError;
use thiserror::Error;

/// Errors that can occur while resampling a product cube.
#[derive(Error, Debug)]
pub enum RegridError {
    /// The product cube's data does not match its axes.
    #[error("malformed product cube: {0}")]
    InvalidCube(#[from] CubeDataError),

    /// The cube's native CRS cannot be handled.
    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// The target grid has no points.
    #[error("target grid is empty")]
    EmptyGrid,
}

/// Result type for regrid operations.
pub type Result<T> = std::result::Result<T, RegridError>;
