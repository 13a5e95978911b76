//! Interpolation kernels for grid resampling.
//!
//! Kernels take fractional (column, row) positions into a row-major
//! plane; [`fractional_index`] converts a coordinate value into such a
//! position along one monotonic axis.

/// Relative tolerance when matching coordinates against axis edges.
const EDGE_TOLERANCE: f64 = 1e-9;

/// Locate `value` on a monotonic axis as a fractional index.
///
/// Works for ascending and descending axes. Returns `None` when the
/// value lies outside `[first, last]`, so callers can emit a missing
/// value instead of extrapolating.
pub fn fractional_index(axis: &[f64], value: f64) -> Option<f64> {
    let n = axis.len();
    if n == 0 || !value.is_finite() {
        return None;
    }

    let first = axis[0];
    let last = axis[n - 1];
    let tol = EDGE_TOLERANCE * first.abs().max(last.abs()).max(1.0);

    if n == 1 {
        return ((value - first).abs() <= tol).then_some(0.0);
    }

    let (lo, hi) = if first <= last { (first, last) } else { (last, first) };
    if value < lo - tol || value > hi + tol {
        return None;
    }
    let v = value.clamp(lo, hi);

    let ascending = last > first;
    let upper = if ascending {
        axis.partition_point(|&a| a <= v)
    } else {
        axis.partition_point(|&a| a >= v)
    };
    let i = upper.saturating_sub(1).min(n - 2);

    let span = axis[i + 1] - axis[i];
    let frac = if span == 0.0 { 0.0 } else { (v - axis[i]) / span };
    Some(i as f64 + frac.clamp(0.0, 1.0))
}

/// Nearest neighbor interpolation.
///
/// Returns the value of the nearest grid point.
pub fn nearest_interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    if x < 0.0 || y < 0.0 {
        return f32::NAN;
    }

    let col = x.round() as usize;
    let row = y.round() as usize;

    if col >= width || row >= height {
        return f32::NAN;
    }

    data[row * width + col]
}

/// Bilinear interpolation.
///
/// Smoothly interpolates between the four nearest grid points.
pub fn bilinear_interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    if x < 0.0 || y < 0.0 || width == 0 || height == 0 {
        return f32::NAN;
    }

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;

    if x0 >= width || y0 >= height {
        return f32::NAN;
    }

    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let xf = (x - x0 as f64) as f32;
    let yf = (y - y0 as f64) as f32;

    let v00 = data[y0 * width + x0];
    let v10 = data[y0 * width + x1];
    let v01 = data[y1 * width + x0];
    let v11 = data[y1 * width + x1];

    // Handle NaN values - if any corner is NaN, return NaN
    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return f32::NAN;
    }

    let top = v00 * (1.0 - xf) + v10 * xf;
    let bottom = v01 * (1.0 - xf) + v11 * xf;
    top * (1.0 - yf) + bottom * yf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractional_index_ascending() {
        let axis = [0.0, 10.0, 20.0, 30.0];
        assert_eq!(fractional_index(&axis, 0.0), Some(0.0));
        assert_eq!(fractional_index(&axis, 15.0), Some(1.5));
        assert_eq!(fractional_index(&axis, 30.0), Some(3.0));
        assert_eq!(fractional_index(&axis, 30.5), None);
        assert_eq!(fractional_index(&axis, -0.1), None);
    }

    #[test]
    fn test_fractional_index_descending() {
        let axis = [46.0, 45.5, 45.0];
        assert_eq!(fractional_index(&axis, 46.0), Some(0.0));
        assert_eq!(fractional_index(&axis, 45.25), Some(1.5));
        assert_eq!(fractional_index(&axis, 45.0), Some(2.0));
        assert_eq!(fractional_index(&axis, 44.9), None);
    }

    #[test]
    fn test_fractional_index_single_point() {
        assert_eq!(fractional_index(&[5.0], 5.0), Some(0.0));
        assert_eq!(fractional_index(&[5.0], 5.1), None);
        assert_eq!(fractional_index(&[], 5.0), None);
        assert_eq!(fractional_index(&[0.0, 1.0], f64::NAN), None);
    }

    /// 4 x 3 plane where value = 10 * row + col.
    fn ramp() -> Vec<f32> {
        (0..3)
            .flat_map(|row| (0..4).map(move |col| (10 * row + col) as f32))
            .collect()
    }

    #[test]
    fn test_nearest_ties_round_away_from_zero() {
        let data = ramp();
        assert_eq!(nearest_interpolate(&data, 4, 3, 0.5, 0.0), 1.0);
        assert_eq!(nearest_interpolate(&data, 4, 3, 2.49, 1.5), 22.0);
        assert_eq!(nearest_interpolate(&data, 4, 3, 3.0, 2.0), 23.0);
    }

    #[test]
    fn test_nearest_outside_plane_is_nan() {
        let data = ramp();
        assert!(nearest_interpolate(&data, 4, 3, -0.2, 1.0).is_nan());
        assert!(nearest_interpolate(&data, 4, 3, 1.0, -1e-9).is_nan());
        assert!(nearest_interpolate(&data, 4, 3, 3.5, 0.0).is_nan());
        assert!(nearest_interpolate(&[], 0, 0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn test_bilinear_reproduces_planar_field() {
        let data = ramp();
        for (x, y) in [(0.0, 0.0), (1.25, 0.5), (2.5, 1.75), (3.0, 2.0), (0.1, 1.9)] {
            let want = (10.0 * y + x) as f32;
            let got = bilinear_interpolate(&data, 4, 3, x, y);
            assert!((got - want).abs() < 1e-4, "({}, {}): {} vs {}", x, y, got, want);
        }
    }

    #[test]
    fn test_bilinear_guards() {
        let data = ramp();
        assert!(bilinear_interpolate(&data, 4, 3, -0.01, 0.0).is_nan());
        assert!(bilinear_interpolate(&data, 4, 3, 0.0, -0.5).is_nan());
        assert!(bilinear_interpolate(&data, 4, 3, 4.0, 0.0).is_nan());
        assert!(bilinear_interpolate(&[], 0, 3, 0.0, 0.0).is_nan());
        assert!(bilinear_interpolate(&[], 4, 0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn test_bilinear_single_column_source() {
        let column = [1.0, 3.0, 5.0];
        assert_eq!(bilinear_interpolate(&column, 1, 3, 0.0, 1.5), 4.0);
    }

    #[test]
    fn test_bilinear_missing_corner_is_nan() {
        let mut data = ramp();
        data[4 + 2] = f32::NAN;
        assert!(bilinear_interpolate(&data, 4, 3, 1.5, 0.5).is_nan());
        // Cells not touching the gap still interpolate
        assert_eq!(bilinear_interpolate(&data, 4, 3, 0.5, 1.5), 15.5);
    }
}
