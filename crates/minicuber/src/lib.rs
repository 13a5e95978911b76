//! Minicube assembly.
//!
//! Builds a small co-registered stack of layers around one center point by
//! querying pluggable data providers, resampling their output onto a shared
//! lon/lat grid and merging everything into one [`Cube`].
//!
//! # Architecture
//!
//! - [`GridPlanner`] lays out the bounding box in the local UTM zone and
//!   derives the target grid and a padded query box
//! - [`TimeChunker`] splits the requested interval into month-aligned chunks
//! - [`Provider`]s are instantiated by name from a [`ProviderRegistry`]
//!   and called through a [`RetryPolicy`]
//! - [`CubeAssembler`] drives providers chunk by chunk, regrids and merges
//! - [`EncodingPlanner`] picks storage encodings for the finished cube
//!
//! # Example
//!
//! ```ignore
//! use minicuber::{AssemblerConfig, CubeAssembler, ProviderRegistry, Specification};
//!
//! let mut registry = ProviderRegistry::new();
//! registry.register("s2", |kwargs| Ok(Box::new(Sentinel2::from_kwargs(kwargs)?)));
//!
//! let spec = Specification::from_yaml_str(&std::fs::read_to_string("cube.yaml")?)?;
//! let cube = CubeAssembler::new(registry, AssemblerConfig::from_env())
//!     .build(&spec)
//!     .await?;
//! ```

pub mod assembler;
pub mod batch;
pub mod chunker;
pub mod config;
pub mod encoding;
pub mod error;
pub mod merge;
pub mod planner;
pub mod provider;
pub mod retry;
pub mod spec;

// Re-exports
pub use assembler::{BuildPlan, CubeAssembler, SOFTWARE_NAME};
pub use batch::build_batch;
pub use chunker::{TimeChunker, TimeChunks};
pub use config::{AssemblerConfig, Compression, EncodingConfig};
pub use encoding::{EncodingPlanner, VariableEncoding};
pub use error::{MinicuberError, ProviderError, Result};
pub use merge::{clip_time, merge_into, namespace};
pub use planner::{compute_bbox, compute_grid, compute_padded_bbox, GridPlanner};
pub use provider::{LoadRequest, Provider, ProviderConstructor, ProviderRegistry, ProviderSpec};
pub use retry::{ProviderOutcome, RetryPolicy};
pub use spec::Specification;

pub use cube_common::{Cube, ProviderKind};
