//! Universal Transverse Mercator on the WGS84 ellipsoid.
//!
//! Forward and inverse series follow Snyder, "Map Projections: A Working
//! Manual" (USGS PP 1395), pp. 61-64. Within a 6° zone the round trip is
//! accurate to well under a millimetre.

use std::f64::consts::PI;

use crate::error::{ProjectionError, Result};

/// WGS84 semi-major axis (metres).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Latitude limits of the UTM system's area of use.
const MIN_LAT: f64 = -80.0;
const MAX_LAT: f64 = 84.0;

/// A UTM zone: number 1..=60 plus hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtmZone {
    pub number: u8,
    pub north: bool,
}

impl UtmZone {
    /// Look up the zone whose area of use contains a point.
    ///
    /// Zones are the regular 6° bands. A point shared by two areas of use
    /// resolves to the lowest EPSG code: the western zone on a zone meridian
    /// and the northern hemisphere on the equator. Longitude -180 is zone 1.
    pub fn for_point(lon: f64, lat: f64) -> Result<Self> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(ProjectionError::NonFinite { lon, lat });
        }
        if !(-180.0..=180.0).contains(&lon) || !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(ProjectionError::NoUtmZone { lon, lat });
        }
        let number = ((lon + 180.0) / 6.0).ceil().clamp(1.0, 60.0) as u8;
        Ok(Self {
            number,
            north: lat >= 0.0,
        })
    }

    /// EPSG code of the WGS84 / UTM CRS for this zone (326xx or 327xx).
    pub fn epsg(&self) -> u32 {
        let base = if self.north { 32600 } else { 32700 };
        base + self.number as u32
    }

    pub fn from_epsg(epsg: u32) -> Option<Self> {
        let (north, number) = match epsg {
            32601..=32660 => (true, epsg - 32600),
            32701..=32760 => (false, epsg - 32700),
            _ => return None,
        };
        Some(Self {
            number: number as u8,
            north,
        })
    }

    /// Longitude of the central meridian in degrees.
    pub fn central_meridian(&self) -> f64 {
        self.number as f64 * 6.0 - 183.0
    }
}

/// Transverse Mercator projection for one UTM zone.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    pub zone: UtmZone,
    lon0: f64,
    e2: f64,
    ep2: f64,
    /// Coefficients of the meridian arc series.
    m1: f64,
    m2: f64,
    m3: f64,
    m4: f64,
    /// Coefficients of the footpoint latitude series.
    e1: f64,
}

impl TransverseMercator {
    pub fn new(zone: UtmZone) -> Self {
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let sqrt_1me2 = (1.0 - e2).sqrt();

        Self {
            zone,
            lon0: zone.central_meridian().to_radians(),
            e2,
            ep2: e2 / (1.0 - e2),
            m1: 1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0,
            m2: 3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0,
            m3: 15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0,
            m4: 35.0 * e6 / 3072.0,
            e1: (1.0 - sqrt_1me2) / (1.0 + sqrt_1me2),
        }
    }

    /// Distance along the meridian from the equator to latitude `phi`.
    fn meridian_arc(&self, phi: f64) -> f64 {
        WGS84_A
            * (self.m1 * phi - self.m2 * (2.0 * phi).sin() + self.m3 * (4.0 * phi).sin()
                - self.m4 * (6.0 * phi).sin())
    }

    /// Geographic degrees to (easting, northing) in metres.
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let phi = lat.to_radians();
        let mut dlon = lon.to_radians() - self.lon0;
        // Normalize longitude difference to [-π, π]
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let (sin_phi, cos_phi) = phi.sin_cos();
        let n = WGS84_A / (1.0 - self.e2 * sin_phi * sin_phi).sqrt();
        let t = phi.tan().powi(2);
        let c = self.ep2 * cos_phi * cos_phi;
        let a = dlon * cos_phi;
        let m = self.meridian_arc(phi);

        let x = K0
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * self.ep2) * a.powi(5) / 120.0);
        let y = K0
            * (m + n
                * phi.tan()
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * self.ep2) * a.powi(6)
                        / 720.0));

        let northing = if self.zone.north {
            y
        } else {
            y + FALSE_NORTHING_SOUTH
        };
        (x + FALSE_EASTING, northing)
    }

    /// (easting, northing) in metres back to geographic degrees.
    pub fn inverse(&self, easting: f64, northing: f64) -> (f64, f64) {
        let x = easting - FALSE_EASTING;
        let y = if self.zone.north {
            northing
        } else {
            northing - FALSE_NORTHING_SOUTH
        };

        let m = y / K0;
        let mu = m / (WGS84_A * self.m1);
        let e1 = self.e1;
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin_phi1, cos_phi1) = phi1.sin_cos();
        let tan_phi1 = phi1.tan();
        let c1 = self.ep2 * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let denom = 1.0 - self.e2 * sin_phi1 * sin_phi1;
        let n1 = WGS84_A / denom.sqrt();
        let r1 = WGS84_A * (1.0 - self.e2) / denom.powf(1.5);
        let d = x / (n1 * K0);

        let phi = phi1
            - (n1 * tan_phi1 / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * self.ep2) * d.powi(4)
                        / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * self.ep2
                        - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let lon = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * self.ep2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / cos_phi1;

        (lon.to_degrees(), phi.to_degrees())
    }
}
