//! Resampling of provider output onto the target grid.
//!
//! Variables are resampled in two groups by interpolation policy:
//! categorical layers with nearest neighbor, continuous layers with
//! bilinear interpolation. Target points outside the source coverage
//! become NaN.

use cube_common::{
    DataVariable, InterpolationPolicy, ProductCube, RegriddedCube, SpatialAxes, TargetGrid,
    VariableLayout,
};
use projection::Transformer;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{RegridError, Result};
use crate::interpolation::{bilinear_interpolate, fractional_index, nearest_interpolate};

/// Fractional source positions for every target point, row-major.
///
/// `None` marks target points outside the source coverage.
#[derive(Debug, Clone)]
pub struct SamplePositions {
    positions: Vec<Option<(f64, f64)>>,
}

impl SamplePositions {
    /// Compute where each target point falls on the source axes.
    pub fn compute(grid: &TargetGrid, axes: &SpatialAxes) -> Result<Self> {
        let transformer = match axes {
            SpatialAxes::Projected { epsg, .. } => Some(Transformer::from_epsg(*epsg)?),
            SpatialAxes::Geographic { .. } => None,
        };
        let columns = axes.columns();
        let rows = axes.rows();

        let positions = grid
            .points()
            .map(|(lon, lat)| {
                let (x, y) = match &transformer {
                    Some(t) => t.forward(lon, lat),
                    None => (lon, lat),
                };
                Some((fractional_index(columns, x)?, fractional_index(rows, y)?))
            })
            .collect();

        Ok(Self { positions })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of target points covered by the source.
    pub fn covered(&self) -> usize {
        self.positions.iter().filter(|p| p.is_some()).count()
    }
}

/// Resamples product cubes onto one fixed target grid.
#[derive(Debug, Clone)]
pub struct Regridder {
    grid: TargetGrid,
}

impl Regridder {
    pub fn new(grid: TargetGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &TargetGrid {
        &self.grid
    }

    /// Resample `cube` onto the target grid.
    ///
    /// Output variables keep the input order and descriptors; series
    /// variables (no spatial dims) pass through unchanged.
    pub fn regrid(&self, cube: &ProductCube) -> Result<RegriddedCube> {
        if self.grid.is_empty() {
            return Err(RegridError::EmptyGrid);
        }
        cube.validate()?;

        let samples = SamplePositions::compute(&self.grid, &cube.axes)?;
        debug!(
            projected = cube.axes.is_projected(),
            covered = samples.covered(),
            total = samples.len(),
            variables = cube.variables.len(),
            "Regridding product cube"
        );

        let (nearest, linear): (Vec<&DataVariable>, Vec<&DataVariable>) = cube
            .variables
            .iter()
            .filter(|v| v.layout.is_spatial())
            .partition(|v| v.descriptor.interpolation == InterpolationPolicy::Nearest);

        let mut resampled = Vec::with_capacity(cube.variables.len());
        for (group, method) in [
            (nearest, InterpolationPolicy::Nearest),
            (linear, InterpolationPolicy::Linear),
        ] {
            if group.is_empty() {
                continue;
            }
            resampled.extend(
                group
                    .into_iter()
                    .map(|v| self.resample_variable(v, cube, &samples, method)),
            );
        }

        // Restore provider emission order across the two groups
        let variables = cube
            .variables
            .iter()
            .filter_map(|original| {
                if !original.layout.is_spatial() {
                    return Some(original.clone());
                }
                let idx = resampled.iter().position(|r| r.name() == original.name())?;
                Some(resampled.swap_remove(idx))
            })
            .collect();

        Ok(RegriddedCube {
            lon: self.grid.lon.clone(),
            lat: self.grid.lat.clone(),
            time: cube.time.clone(),
            variables,
        })
    }

    fn resample_variable(
        &self,
        variable: &DataVariable,
        cube: &ProductCube,
        samples: &SamplePositions,
        method: InterpolationPolicy,
    ) -> DataVariable {
        let src_nx = cube.axes.nx();
        let src_ny = cube.axes.ny();
        let plane_len = src_nx * src_ny;
        let steps = match variable.layout {
            VariableLayout::TimeGrid => cube.nt(),
            _ => 1,
        };

        // One output plane per time step, filled in parallel
        let mut data = vec![f32::NAN; steps * samples.len()];
        data.par_chunks_mut(samples.len().max(1))
            .enumerate()
            .for_each(|(t, out)| {
                let plane = &variable.data[t * plane_len..(t + 1) * plane_len];
                for (value, pos) in out.iter_mut().zip(&samples.positions) {
                    if let Some((x, y)) = pos {
                        *value = match method {
                            InterpolationPolicy::Nearest => {
                                nearest_interpolate(plane, src_nx, src_ny, *x, *y)
                            }
                            InterpolationPolicy::Linear => {
                                bilinear_interpolate(plane, src_nx, src_ny, *x, *y)
                            }
                        };
                    }
                }
            });

        DataVariable::new(variable.descriptor.clone(), variable.layout, data)
    }
}
