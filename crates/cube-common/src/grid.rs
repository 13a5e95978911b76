//! The regular lon/lat grid every provider output is resampled onto.

use serde::{Deserialize, Serialize};

use crate::BoundingBox;

/// A regular geographic sampling grid.
///
/// Longitudes ascend west to east; latitudes descend north to south, so
/// row 0 of any gridded array is the northern edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetGrid {
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
}

impl TargetGrid {
    /// Build a grid of `nx` x `ny` points spanning `bbox` edge to edge.
    pub fn from_bbox(bbox: &BoundingBox, nx: usize, ny: usize) -> Self {
        Self {
            lon: linspace(bbox.min_lon, bbox.max_lon, nx),
            lat: linspace(bbox.max_lat, bbox.min_lat, ny),
        }
    }

    pub fn nx(&self) -> usize {
        self.lon.len()
    }

    pub fn ny(&self) -> usize {
        self.lat.len()
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.nx() * self.ny()
    }

    pub fn is_empty(&self) -> bool {
        self.lon.is_empty() || self.lat.is_empty()
    }

    /// All (lon, lat) points in row-major order (north row first).
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lat
            .iter()
            .flat_map(move |&lat| self.lon.iter().map(move |&lon| (lon, lat)))
    }
}

/// `n` evenly spaced values from `start` to `stop`, both included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_endpoints() {
        let v = linspace(0.0, 1.0, 5);
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 7.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_grid_orientation() {
        let grid = TargetGrid::from_bbox(&BoundingBox::new(10.0, 45.0, 11.0, 46.0), 3, 2);
        assert_eq!(grid.lon, vec![10.0, 10.5, 11.0]);
        assert_eq!(grid.lat, vec![46.0, 45.0]);
        assert_eq!(grid.len(), 6);

        let points: Vec<_> = grid.points().collect();
        assert_eq!(points[0], (10.0, 46.0));
        assert_eq!(points[3], (10.0, 45.0));
    }
}
