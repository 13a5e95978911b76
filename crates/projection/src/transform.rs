//! Transformations between WGS84 and the supported target CRSs.

use crate::error::{ProjectionError, Result};
use crate::utm::{TransverseMercator, UtmZone};

/// Points sampled along each bbox edge when transforming bounds.
pub const DEFAULT_DENSIFY_POINTS: usize = 21;

/// A coordinate reference system the pipeline can work in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// EPSG:4326, lon/lat degrees.
    Geographic,
    /// WGS84 / UTM, metres.
    Utm(UtmZone),
}

impl Crs {
    pub fn from_epsg(epsg: u32) -> Result<Self> {
        if epsg == 4326 {
            return Ok(Crs::Geographic);
        }
        UtmZone::from_epsg(epsg)
            .map(Crs::Utm)
            .ok_or(ProjectionError::UnsupportedEpsg(epsg))
    }

    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Geographic => 4326,
            Crs::Utm(zone) => zone.epsg(),
        }
    }

    /// The local metric CRS for a geographic point.
    pub fn local_metric(lon: f64, lat: f64) -> Result<Self> {
        UtmZone::for_point(lon, lat).map(Crs::Utm)
    }
}

/// Transforms points from WGS84 into a target CRS and back.
///
/// Axis order is always (x/lon, y/lat).
#[derive(Debug, Clone)]
pub struct Transformer {
    target: Crs,
    tm: Option<TransverseMercator>,
}

impl Transformer {
    pub fn new(target: Crs) -> Self {
        let tm = match target {
            Crs::Geographic => None,
            Crs::Utm(zone) => Some(TransverseMercator::new(zone)),
        };
        Self { target, tm }
    }

    pub fn from_epsg(epsg: u32) -> Result<Self> {
        Crs::from_epsg(epsg).map(Self::new)
    }

    pub fn target(&self) -> Crs {
        self.target
    }

    /// WGS84 (lon, lat) to target (x, y).
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        match &self.tm {
            Some(tm) => tm.forward(lon, lat),
            None => (lon, lat),
        }
    }

    /// Target (x, y) to WGS84 (lon, lat).
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        match &self.tm {
            Some(tm) => tm.inverse(x, y),
            None => (x, y),
        }
    }

    /// Transform a target-CRS box to geographic bounds.
    ///
    /// Each edge is densified with `densify` points so the curvature of
    /// projected edges is captured; returns (left, bottom, right, top).
    pub fn inverse_bounds(
        &self,
        left: f64,
        bottom: f64,
        right: f64,
        top: f64,
        densify: usize,
    ) -> (f64, f64, f64, f64) {
        let n = densify.max(2);
        let mut min_lon = f64::INFINITY;
        let mut min_lat = f64::INFINITY;
        let mut max_lon = f64::NEG_INFINITY;
        let mut max_lat = f64::NEG_INFINITY;

        let mut visit = |x: f64, y: f64| {
            let (lon, lat) = self.inverse(x, y);
            min_lon = min_lon.min(lon);
            min_lat = min_lat.min(lat);
            max_lon = max_lon.max(lon);
            max_lat = max_lat.max(lat);
        };

        for k in 0..n {
            let f = k as f64 / (n - 1) as f64;
            let x = left + (right - left) * f;
            let y = bottom + (top - bottom) * f;
            visit(x, bottom);
            visit(x, top);
            visit(left, y);
            visit(right, y);
        }

        (min_lon, min_lat, max_lon, max_lat)
    }
}
