//! The immutable input describing one minicube.

use cube_common::TimeInterval;
use serde::{Deserialize, Serialize};

use crate::error::{MinicuberError, Result};
use crate::provider::ProviderSpec;

/// Center, shape, resolution, interval and providers of one cube build.
///
/// ```yaml
/// lon_lat: [10.0, 45.0]
/// xy_shape: [128, 128]
/// resolution: 20.0
/// time_interval: "2021-06-01/2021-08-31"
/// providers:
///   - name: s2
///     kwargs: {bands: [B02, B03, B04, B8A]}
///   - name: srtm
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    /// Center as (lon, lat) degrees.
    pub lon_lat: (f64, f64),
    /// Grid shape as (nx, ny).
    pub xy_shape: (usize, usize),
    /// Metres per pixel.
    pub resolution: f64,
    pub time_interval: TimeInterval,
    pub providers: Vec<ProviderSpec>,
}

impl Specification {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let spec: Self =
            serde_yaml::from_str(s).map_err(|e| MinicuberError::Parse(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let spec: Self =
            serde_json::from_str(s).map_err(|e| MinicuberError::Parse(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn lon(&self) -> f64 {
        self.lon_lat.0
    }

    pub fn lat(&self) -> f64 {
        self.lon_lat.1
    }

    pub fn nx(&self) -> usize {
        self.xy_shape.0
    }

    pub fn ny(&self) -> usize {
        self.xy_shape.1
    }

    /// Check the invariants that do not need a provider registry.
    pub fn validate(&self) -> Result<()> {
        let (lon, lat) = self.lon_lat;
        if !lon.is_finite() || !lat.is_finite() {
            return Err(MinicuberError::Config(format!(
                "lon_lat must be finite, got ({}, {})",
                lon, lat
            )));
        }

        if self.nx() == 0 || self.ny() == 0 {
            return Err(MinicuberError::Config(format!(
                "xy_shape must be positive, got ({}, {})",
                self.nx(),
                self.ny()
            )));
        }

        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(MinicuberError::Config(format!(
                "resolution must be > 0, got {}",
                self.resolution
            )));
        }

        if self.time_interval.start > self.time_interval.end {
            return Err(MinicuberError::Config(format!(
                "time_interval start is after end: {}",
                self.time_interval
            )));
        }

        if self.providers.is_empty() {
            return Err(MinicuberError::Config(
                "at least one provider is required".to_string(),
            ));
        }

        if let Some(p) = self.providers.iter().find(|p| p.name.trim().is_empty()) {
            return Err(MinicuberError::Config(format!(
                "provider name must not be empty (kwargs: {})",
                p.kwargs
            )));
        }

        Ok(())
    }
}
