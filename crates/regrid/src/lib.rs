//! Regridding of provider output onto the minicube's target grid.
//!
//! Providers deliver data in their own axes: projected UTM coordinates
//! for most imagery catalogs, lon/lat for reanalysis products. The
//! [`Regridder`] projects every target grid point into the provider's
//! frame and samples each variable there.
//!
//! ```text
//! ProductCube (x, y, epsg)          ProductCube (lon, lat)
//!        │                                 │
//!        ├─► project target lon/lat ─┐     │
//!        │                           ▼     ▼
//!        │                     SamplePositions
//!        │                           │
//!        ├─► nearest group ──────────┤
//!        └─► linear group ───────────┤
//!                                    ▼
//!                             RegriddedCube (lon, lat)
//! ```

pub mod error;
pub mod interpolation;
pub mod regridder;

pub use error::{RegridError, Result};
pub use interpolation::{bilinear_interpolate, fractional_index, nearest_interpolate};
pub use regridder::{Regridder, SamplePositions};
