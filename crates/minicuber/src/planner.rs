//! Bounding box and target grid derivation.
//!
//! The box is laid out in the local UTM zone of the center point and
//! transformed back to geographic bounds. Offsets from the center are
//! `resolution * (n / 2)` with integer division, so an even pixel count
//! yields a box one pixel wider than `n - 1` spacings would need.

use cube_common::{BoundingBox, TargetGrid};
use projection::{Crs, Transformer, DEFAULT_DENSIFY_POINTS};
use tracing::debug;

use crate::error::Result;

/// Plans the spatial frame of one cube build.
#[derive(Debug, Clone)]
pub struct GridPlanner {
    lon: f64,
    lat: f64,
    nx: usize,
    ny: usize,
    resolution: f64,
    transformer: Transformer,
    /// Center in the local metric CRS.
    center: (f64, f64),
}

impl GridPlanner {
    /// Fails when no local metric CRS covers `(lon, lat)`.
    pub fn new(lon: f64, lat: f64, nx: usize, ny: usize, resolution: f64) -> Result<Self> {
        let crs = Crs::local_metric(lon, lat)?;
        let transformer = Transformer::new(crs);
        let center = transformer.forward(lon, lat);
        debug!(lon, lat, epsg = crs.epsg(), "Selected local metric CRS");
        Ok(Self {
            lon,
            lat,
            nx,
            ny,
            resolution,
            transformer,
            center,
        })
    }

    /// EPSG code of the local metric CRS.
    pub fn epsg(&self) -> u32 {
        self.transformer.target().epsg()
    }

    pub fn center(&self) -> (f64, f64) {
        (self.lon, self.lat)
    }

    /// Metric (left, bottom, right, top) of the output box.
    fn metric_bounds(&self) -> (f64, f64, f64, f64) {
        let (x, y) = self.center;
        let dx = self.resolution * (self.nx / 2) as f64;
        let dy = self.resolution * (self.ny / 2) as f64;
        (x - dx, y - dy, x + dx, y + dy)
    }

    fn to_geographic(&self, (left, bottom, right, top): (f64, f64, f64, f64)) -> BoundingBox {
        let (min_lon, min_lat, max_lon, max_lat) =
            self.transformer
                .inverse_bounds(left, bottom, right, top, DEFAULT_DENSIFY_POINTS);
        BoundingBox::new(min_lon, min_lat, max_lon, max_lat)
    }

    pub fn bbox(&self) -> BoundingBox {
        self.to_geographic(self.metric_bounds())
    }

    /// The output box dilated by `cells` grid cells on every side.
    ///
    /// One cell is `extent / n` along each axis.
    pub fn padded_bbox(&self, cells: f64) -> BoundingBox {
        let (left, bottom, right, top) = self.metric_bounds();
        let pad_x = (right - left) / self.nx as f64 * cells;
        let pad_y = (top - bottom) / self.ny as f64 * cells;
        self.to_geographic((left - pad_x, bottom - pad_y, right + pad_x, top + pad_y))
    }

    pub fn grid(&self) -> TargetGrid {
        TargetGrid::from_bbox(&self.bbox(), self.nx, self.ny)
    }
}

/// Geographic box of an `nx` x `ny` grid at `resolution` metres around
/// `(lon, lat)`.
pub fn compute_bbox(lon: f64, lat: f64, nx: usize, ny: usize, resolution: f64) -> Result<BoundingBox> {
    Ok(GridPlanner::new(lon, lat, nx, ny, resolution)?.bbox())
}

/// [`compute_bbox`] padded by `cells` grid cells per side.
pub fn compute_padded_bbox(
    lon: f64,
    lat: f64,
    nx: usize,
    ny: usize,
    resolution: f64,
    cells: f64,
) -> Result<BoundingBox> {
    Ok(GridPlanner::new(lon, lat, nx, ny, resolution)?.padded_bbox(cells))
}

/// Evenly spaced longitudes (west to east) and latitudes (north to south).
pub fn compute_grid(bbox: &BoundingBox, nx: usize, ny: usize) -> TargetGrid {
    TargetGrid::from_bbox(bbox, nx, ny)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MinicuberError;
    use test_utils::assert_approx_eq;
    use test_utils::fixtures::location;

    #[test]
    fn test_bbox_is_deterministic() {
        let (lon, lat) = location::PO_VALLEY;
        let a = compute_bbox(lon, lat, 4, 4, 100.0).unwrap();
        let b = compute_bbox(lon, lat, 4, 4, 100.0).unwrap();
        assert_eq!(a, b);
        assert!(a.contains_point(lon, lat));
    }

    #[test]
    fn test_bbox_extent_matches_resolution() {
        let (lon, lat) = location::PO_VALLEY;
        let planner = GridPlanner::new(lon, lat, 4, 4, 100.0).unwrap();
        assert_eq!(planner.epsg(), 32632);
        // 400 m north-south at 45N is about 0.0036 degrees
        let bbox = planner.bbox();
        assert_approx_eq!(bbox.height(), 400.0 / 111_132.0, 1e-4);
    }

    #[test]
    fn test_odd_and_even_sizes_share_extent() {
        // n // 2 is 2 for both 4 and 5
        let (lon, lat) = location::MONTPELLIER;
        let even = compute_bbox(lon, lat, 4, 4, 30.0).unwrap();
        let odd = compute_bbox(lon, lat, 5, 5, 30.0).unwrap();
        assert_eq!(even, odd);
    }

    #[test]
    fn test_padding_contains_bbox() {
        for &(lon, lat) in &[location::PO_VALLEY, location::MONTPELLIER, location::NAMIBIA] {
            let bbox = compute_bbox(lon, lat, 128, 64, 20.0).unwrap();
            let padded = compute_padded_bbox(lon, lat, 128, 64, 20.0, 6.0).unwrap();
            assert!(padded.contains(&bbox), "{} !>= {}", padded, bbox);
            assert!(padded.width() > bbox.width());
        }
    }

    #[test]
    fn test_zero_padding_is_bbox() {
        let (lon, lat) = location::NAMIBIA;
        let planner = GridPlanner::new(lon, lat, 10, 10, 30.0).unwrap();
        assert_eq!(planner.padded_bbox(0.0), planner.bbox());
    }

    #[test]
    fn test_grid_orientation() {
        let (lon, lat) = location::PO_VALLEY;
        let bbox = compute_bbox(lon, lat, 6, 3, 100.0).unwrap();
        let grid = compute_grid(&bbox, 6, 3);
        assert_eq!(grid.nx(), 6);
        assert_eq!(grid.ny(), 3);
        assert!(grid.lon.windows(2).all(|w| w[1] > w[0]));
        assert!(grid.lat.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(grid.lon[0], bbox.min_lon);
        assert_eq!(grid.lat[0], bbox.max_lat);
    }

    #[test]
    fn test_no_zone_is_grid_error() {
        let (lon, lat) = location::SVALBARD_NORTH;
        assert!(matches!(
            compute_bbox(lon, lat, 4, 4, 100.0),
            Err(MinicuberError::Grid(_))
        ));
    }
}
