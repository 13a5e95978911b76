//! Shared test utilities for the minicube workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic product cube generators (geographic and UTM axes)
//! - Common locations and specification documents
//! - Approximate float assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

pub use generators::*;

/// Approximate equality of two scalars, compared as `f64`.
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(250.0_f32, 250.00002_f64, 1e-4); // mixed widths compare as f64
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Element-wise approximate equality of two float slices.
///
/// NaN matches NaN, so gap patterns are compared too.
#[macro_export]
macro_rules! assert_all_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: &[f32] = &$left;
        let right: &[f32] = &$right;
        assert_eq!(left.len(), right.len(), "length mismatch");
        for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
            if l.is_nan() || r.is_nan() {
                assert!(
                    l.is_nan() && r.is_nan(),
                    "NaN mismatch at index {}: {} vs {}",
                    i,
                    l,
                    r
                );
            } else if (*l as f64 - *r as f64).abs() > $epsilon as f64 {
                panic!(
                    "assertion failed at index {}: `{}` vs `{}` (epsilon {})",
                    i, l, r, $epsilon
                );
            }
        }
    }};
}
