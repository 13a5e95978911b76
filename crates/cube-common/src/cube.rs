//! Labeled array types: provider output, regridded output and the
//! assembled minicube.
//!
//! All arrays are `f32` in row-major order. Gridded layers are stored
//! `[lat][lon]` with the northern row first, time series layers as
//! `[time][lat][lon]`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CubeDataError, CubeResult};
use crate::grid::TargetGrid;
use crate::variable::VariableDescriptor;
use crate::TimeInterval;

/// Dimensions a variable's data is laid out over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableLayout {
    /// `(lat, lon)` or `(y, x)`.
    Grid,
    /// `(time, lat, lon)` or `(time, y, x)`.
    TimeGrid,
    /// `(time)` only, e.g. per-scene availability flags.
    Series,
}

impl VariableLayout {
    pub fn has_time(&self) -> bool {
        !matches!(self, Self::Grid)
    }

    pub fn is_spatial(&self) -> bool {
        !matches!(self, Self::Series)
    }

    /// Number of values for a layout over `nt` steps and an `nx` x `ny` plane.
    pub fn len(&self, nt: usize, ny: usize, nx: usize) -> usize {
        match self {
            Self::Grid => ny * nx,
            Self::TimeGrid => nt * ny * nx,
            Self::Series => nt,
        }
    }
}

/// One data variable and its values.
#[derive(Debug, Clone, PartialEq)]
pub struct DataVariable {
    pub descriptor: VariableDescriptor,
    pub layout: VariableLayout,
    pub data: Vec<f32>,
}

impl DataVariable {
    pub fn new(descriptor: VariableDescriptor, layout: VariableLayout, data: Vec<f32>) -> Self {
        Self {
            descriptor,
            layout,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn check_len(&self, nt: usize, ny: usize, nx: usize) -> CubeResult<()> {
        let expected = self.layout.len(nt, ny, nx);
        if self.data.len() != expected {
            return Err(CubeDataError::ShapeMismatch {
                name: self.name().to_string(),
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

/// Spatial coordinates of a provider's output.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialAxes {
    /// Pixel-center coordinates in a projected CRS (metres), identified by
    /// EPSG code.
    Projected { x: Vec<f64>, y: Vec<f64>, epsg: u32 },
    /// Geographic coordinates in degrees.
    Geographic { lon: Vec<f64>, lat: Vec<f64> },
}

impl SpatialAxes {
    /// Horizontal axis values (x or lon).
    pub fn columns(&self) -> &[f64] {
        match self {
            Self::Projected { x, .. } => x,
            Self::Geographic { lon, .. } => lon,
        }
    }

    /// Vertical axis values (y or lat).
    pub fn rows(&self) -> &[f64] {
        match self {
            Self::Projected { y, .. } => y,
            Self::Geographic { lat, .. } => lat,
        }
    }

    pub fn nx(&self) -> usize {
        self.columns().len()
    }

    pub fn ny(&self) -> usize {
        self.rows().len()
    }

    pub fn is_projected(&self) -> bool {
        matches!(self, Self::Projected { .. })
    }
}

/// A labeled array as returned by a single provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCube {
    pub axes: SpatialAxes,
    pub time: Option<Vec<DateTime<Utc>>>,
    pub variables: Vec<DataVariable>,
}

impl ProductCube {
    pub fn new(axes: SpatialAxes) -> Self {
        Self {
            axes,
            time: None,
            variables: Vec::new(),
        }
    }

    pub fn with_time(mut self, time: Vec<DateTime<Utc>>) -> Self {
        self.time = Some(time);
        self
    }

    /// Add a variable, rejecting duplicate names.
    pub fn push_variable(&mut self, variable: DataVariable) -> CubeResult<()> {
        if self.variable(variable.name()).is_some() {
            return Err(CubeDataError::DuplicateVariable(variable.name().to_string()));
        }
        self.variables.push(variable);
        Ok(())
    }

    pub fn variable(&self, name: &str) -> Option<&DataVariable> {
        self.variables.iter().find(|v| v.name() == name)
    }

    pub fn nt(&self) -> usize {
        self.time.as_ref().map_or(0, Vec::len)
    }

    /// Check axes and every variable's data length against its layout.
    pub fn validate(&self) -> CubeResult<()> {
        check_axis("x/lon", self.axes.columns())?;
        check_axis("y/lat", self.axes.rows())?;
        for (i, variable) in self.variables.iter().enumerate() {
            if self.variables[..i].iter().any(|v| v.name() == variable.name()) {
                return Err(CubeDataError::DuplicateVariable(variable.name().to_string()));
            }
            if variable.layout.has_time() && self.time.is_none() {
                return Err(CubeDataError::MissingTimeAxis(variable.name().to_string()));
            }
            variable.check_len(self.nt(), self.axes.ny(), self.axes.nx())?;
        }
        Ok(())
    }
}

/// A product cube resampled onto the target grid.
///
/// Carries no provider-native CRS information.
#[derive(Debug, Clone, PartialEq)]
pub struct RegriddedCube {
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    pub time: Option<Vec<DateTime<Utc>>>,
    pub variables: Vec<DataVariable>,
}

impl RegriddedCube {
    pub fn variable(&self, name: &str) -> Option<&DataVariable> {
        self.variables.iter().find(|v| v.name() == name)
    }
}

/// Whether a provider's output varies with time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Queried once per time chunk.
    Temporal,
    /// Queried once per build (terrain, soil, land cover).
    Static,
}

/// Per-provider outcome counts for one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub name: String,
    pub prefix: String,
    pub kind: ProviderKind,
    pub chunks_with_data: usize,
    pub chunks_without_data: usize,
    pub chunks_failed: usize,
}

impl ProviderRecord {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            kind,
            chunks_with_data: 0,
            chunks_without_data: 0,
            chunks_failed: 0,
        }
    }

    /// True when the provider contributed nothing to the cube.
    pub fn is_absent(&self) -> bool {
        self.chunks_with_data == 0
    }
}

/// Dataset-level metadata attached when a build completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub created: DateTime<Utc>,
    pub software: String,
    pub version: String,
    pub build_id: Uuid,
    /// Requested center as (lon, lat).
    pub location: (f64, f64),
    pub interval: TimeInterval,
    pub providers: Vec<ProviderRecord>,
    /// Set when the build was cancelled between provider calls.
    pub interrupted: bool,
}

/// The assembled minicube.
///
/// Every variable shares `lon`/`lat`; time-dependent variables are indexed
/// against `time`, which is sorted and free of duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    pub time: Vec<DateTime<Utc>>,
    pub variables: Vec<DataVariable>,
    pub provenance: Option<Provenance>,
}

impl Cube {
    /// An empty cube on the given grid.
    pub fn empty(grid: &TargetGrid) -> Self {
        Self {
            lon: grid.lon.clone(),
            lat: grid.lat.clone(),
            time: Vec::new(),
            variables: Vec::new(),
            provenance: None,
        }
    }

    pub fn variable(&self, name: &str) -> Option<&DataVariable> {
        self.variables.iter().find(|v| v.name() == name)
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(DataVariable::name).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Spatial shape as (ny, nx).
    pub fn shape(&self) -> (usize, usize) {
        (self.lat.len(), self.lon.len())
    }

    /// Value of `name` at time step `t`, row `row` and column `col`.
    ///
    /// `t` is ignored for static layers; `row`/`col` are ignored for series.
    pub fn value_at(&self, name: &str, t: usize, row: usize, col: usize) -> Option<f32> {
        let variable = self.variable(name)?;
        let (ny, nx) = self.shape();
        if row >= ny || col >= nx {
            return None;
        }
        let index = match variable.layout {
            VariableLayout::Grid => row * nx + col,
            VariableLayout::TimeGrid => t * ny * nx + row * nx + col,
            VariableLayout::Series => t,
        };
        variable.data.get(index).copied()
    }

    pub fn validate(&self) -> CubeResult<()> {
        let (ny, nx) = self.shape();
        for variable in &self.variables {
            variable.check_len(self.time.len(), ny, nx)?;
        }
        Ok(())
    }
}

fn check_axis(name: &str, axis: &[f64]) -> CubeResult<()> {
    if axis.is_empty() {
        return Err(CubeDataError::InvalidAxis(name.to_string()));
    }
    let ascending = axis.windows(2).all(|w| w[1] > w[0]);
    let descending = axis.windows(2).all(|w| w[1] < w[0]);
    if !(ascending || descending) {
        return Err(CubeDataError::InvalidAxis(name.to_string()));
    }
    Ok(())
}
