//! Common types shared by the minicube crates.
//!
//! Providers produce [`ProductCube`]s, the regridder turns them into
//! [`RegriddedCube`]s on a [`TargetGrid`], and the assembler merges those
//! into a [`Cube`].

pub mod bbox;
pub mod cube;
pub mod error;
pub mod grid;
pub mod time;
pub mod variable;

pub use bbox::BoundingBox;
pub use cube::{
    Cube, DataVariable, ProductCube, Provenance, ProviderKind, ProviderRecord, RegriddedCube,
    SpatialAxes, VariableLayout,
};
pub use error::{CubeDataError, CubeResult};
pub use grid::{linspace, TargetGrid};
pub use time::{TimeChunk, TimeInterval};
pub use variable::{InterpolationPolicy, VariableDescriptor};
