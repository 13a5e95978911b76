//! Per-variable storage encodings for persisting a cube.
//!
//! Categorical layers are stored losslessly. Continuous layers are
//! quantized to `bits`-bit signed integers from their observed range;
//! the most negative code is reserved as the fill value for NaN.

use cube_common::{Cube, DataVariable};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{Compression, EncodingConfig};

/// How one variable is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariableEncoding {
    /// Full-precision floats (scale 1, offset 0).
    Lossless {
        compression: Compression,
        level: u8,
    },
    /// `stored = round((value - offset) / scale)`, NaN stored as `fill_value`.
    Quantized {
        bits: u8,
        scale: f64,
        offset: f64,
        fill_value: i64,
        compression: Compression,
        level: u8,
    },
}

impl VariableEncoding {
    pub fn is_lossless(&self) -> bool {
        matches!(self, VariableEncoding::Lossless { .. })
    }

    /// Name of the on-disk element type.
    pub fn dtype(&self) -> &'static str {
        match self {
            VariableEncoding::Lossless { .. } => "float32",
            VariableEncoding::Quantized { bits, .. } if *bits <= 8 => "int8",
            VariableEncoding::Quantized { bits, .. } if *bits <= 16 => "int16",
            VariableEncoding::Quantized { .. } => "int32",
        }
    }

    /// Value as stored on disk.
    pub fn encode(&self, value: f32) -> f64 {
        match *self {
            VariableEncoding::Lossless { .. } => value as f64,
            VariableEncoding::Quantized {
                scale,
                offset,
                fill_value,
                ..
            } => {
                if value.is_nan() {
                    return fill_value as f64;
                }
                let max_code = -(fill_value + 1);
                let code = ((value as f64 - offset) / scale).round() as i64;
                code.clamp(fill_value + 1, max_code) as f64
            }
        }
    }

    /// Stored value back to a physical value.
    pub fn decode(&self, stored: f64) -> f32 {
        match *self {
            VariableEncoding::Lossless { .. } => stored as f32,
            VariableEncoding::Quantized {
                scale,
                offset,
                fill_value,
                ..
            } => {
                if stored.is_nan() || stored as i64 == fill_value {
                    return f32::NAN;
                }
                (offset + stored * scale) as f32
            }
        }
    }
}

/// Chooses encodings from interpolation policy and observed range.
#[derive(Debug, Clone, Default)]
pub struct EncodingPlanner {
    config: EncodingConfig,
}

impl EncodingPlanner {
    pub fn new(config: EncodingConfig) -> Self {
        Self { config }
    }

    fn lossless(&self) -> VariableEncoding {
        VariableEncoding::Lossless {
            compression: self.config.compression,
            level: self.config.compression_level,
        }
    }

    pub fn plan(&self, variable: &DataVariable) -> VariableEncoding {
        if variable.descriptor.interpolation.is_categorical() {
            return self.lossless();
        }

        let Some((min, max)) = observed_range(&variable.data) else {
            debug!(variable = %variable.name(), "All values missing, storing losslessly");
            return self.lossless();
        };

        // Ranges below f32 resolution are constant layers
        let magnitude = max.abs().max(min.abs()).max(1.0);
        if !(max - min).is_finite() || max - min <= f32::EPSILON as f64 * magnitude {
            debug!(variable = %variable.name(), "Constant variable, storing losslessly");
            return self.lossless();
        }

        let bits = self.config.bits.clamp(2, 32) as i32;
        let half = 2f64.powi(bits - 1);
        let scale = (max - min) / (2f64.powi(bits) - 2.0);

        VariableEncoding::Quantized {
            bits: bits as u8,
            scale,
            offset: min + (half - 1.0) * scale,
            fill_value: -(half as i64),
            compression: self.config.compression,
            level: self.config.compression_level,
        }
    }

    /// Encodings for every variable of `cube`, in variable order.
    pub fn plan_cube(&self, cube: &Cube) -> Vec<(String, VariableEncoding)> {
        cube.variables
            .iter()
            .map(|v| (v.name().to_string(), self.plan(v)))
            .collect()
    }
}

/// Min and max of the non-NaN values.
fn observed_range(data: &[f32]) -> Option<(f64, f64)> {
    data.iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, &v| {
            let v = v as f64;
            Some(match acc {
                None => (v, v),
                Some((lo, hi)) => (f64::min(lo, v), f64::max(hi, v)),
            })
        })
}
