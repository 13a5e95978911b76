//! Coordinate reference system transformations.
//!
//! Implements the projections the minicube pipeline needs from scratch:
//! WGS84 geographic coordinates and the UTM zones used as local metric
//! frames.

pub mod error;
pub mod transform;
pub mod utm;

pub use error::{ProjectionError, Result};
pub use transform::{Crs, Transformer, DEFAULT_DENSIFY_POINTS};
pub use utm::{TransverseMercator, UtmZone};
