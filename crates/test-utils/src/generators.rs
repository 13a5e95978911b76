//! Generators for synthetic provider output.
//!
//! These build small, predictable [`ProductCube`]s in either geographic or
//! UTM axes so regridding and assembly can be checked by hand.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use cube_common::{
    BoundingBox, DataVariable, InterpolationPolicy, ProductCube, SpatialAxes, TargetGrid,
    VariableDescriptor, VariableLayout,
};
use projection::{Crs, Transformer};

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// `n` timestamps at 10:30 UTC, `step_days` apart, starting on `start`.
pub fn daily_timestamps(start: NaiveDate, n: usize, step_days: i64) -> Vec<DateTime<Utc>> {
    (0..n)
        .map(|i| {
            let day = start + Duration::days(i as i64 * step_days);
            Utc.from_utc_datetime(&day.and_hms_opt(10, 30, 0).unwrap_or_default())
        })
        .collect()
}

/// Geographic axes with `nx` x `ny` points spanning `bbox` edge to edge.
pub fn geographic_axes(bbox: &BoundingBox, nx: usize, ny: usize) -> SpatialAxes {
    let grid = TargetGrid::from_bbox(bbox, nx, ny);
    SpatialAxes::Geographic {
        lon: grid.lon,
        lat: grid.lat,
    }
}

/// UTM axes with pixel spacing `resolution` metres covering `bbox`.
///
/// The zone is picked from the bbox center; x ascends, y descends.
pub fn utm_axes(bbox: &BoundingBox, resolution: f64) -> SpatialAxes {
    let (clon, clat) = bbox.center();
    let crs = Crs::local_metric(clon, clat).unwrap_or(Crs::Geographic);
    let t = Transformer::new(crs);

    let corners = [
        t.forward(bbox.min_lon, bbox.min_lat),
        t.forward(bbox.min_lon, bbox.max_lat),
        t.forward(bbox.max_lon, bbox.min_lat),
        t.forward(bbox.max_lon, bbox.max_lat),
    ];
    let x_min = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
    let x_max = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
    let y_min = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
    let y_max = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

    let nx = ((x_max - x_min) / resolution).ceil() as usize + 1;
    let ny = ((y_max - y_min) / resolution).ceil() as usize + 1;

    SpatialAxes::Projected {
        x: (0..nx).map(|i| x_min + i as f64 * resolution).collect(),
        y: (0..ny).map(|j| y_max - j as f64 * resolution).collect(),
        epsg: crs.epsg(),
    }
}

/// A static cube with one constant `Grid` variable.
pub fn constant_static_cube(
    axes: SpatialAxes,
    name: &str,
    value: f32,
    policy: InterpolationPolicy,
) -> ProductCube {
    let len = axes.nx() * axes.ny();
    let mut cube = ProductCube::new(axes);
    cube.variables.push(DataVariable::new(
        VariableDescriptor::new(name, policy).with_provider("synthetic"),
        VariableLayout::Grid,
        vec![value; len],
    ));
    cube
}

/// A time-varying cube with one `TimeGrid` variable whose value at step
/// `t` is `base + t`.
pub fn ramp_temporal_cube(
    axes: SpatialAxes,
    time: Vec<DateTime<Utc>>,
    name: &str,
    base: f32,
    policy: InterpolationPolicy,
) -> ProductCube {
    let plane = axes.nx() * axes.ny();
    let data = (0..time.len())
        .flat_map(|t| std::iter::repeat(base + t as f32).take(plane))
        .collect();
    let mut cube = ProductCube::new(axes).with_time(time);
    cube.variables.push(DataVariable::new(
        VariableDescriptor::new(name, policy).with_provider("synthetic"),
        VariableLayout::TimeGrid,
        data,
    ));
    cube
}

/// A cube sampling `f(x, y)` on its own axes for a single `Grid` variable.
pub fn field_cube(
    axes: SpatialAxes,
    name: &str,
    policy: InterpolationPolicy,
    f: impl Fn(f64, f64) -> f32,
) -> ProductCube {
    let data = axes
        .rows()
        .iter()
        .flat_map(|&y| axes.columns().iter().map(move |&x| (x, y)))
        .map(|(x, y)| f(x, y))
        .collect();
    let mut cube = ProductCube::new(axes);
    cube.variables.push(DataVariable::new(
        VariableDescriptor::new(name, policy).with_provider("synthetic"),
        VariableLayout::Grid,
        data,
    ));
    cube
}
