//! Common test fixtures for minicube tests.

/// Center points used across tests, as (lon, lat).
pub mod location {
    /// Po valley, northern Italy (UTM zone 32N)
    pub const PO_VALLEY: (f64, f64) = (10.0, 45.0);

    /// Montpellier region (UTM zone 31N)
    pub const MONTPELLIER: (f64, f64) = (3.087414, 43.598946);

    /// Southern hemisphere, Namibia (UTM zone 33S)
    pub const NAMIBIA: (f64, f64) = (17.08, -22.56);

    /// North of the UTM area of use
    pub const SVALBARD_NORTH: (f64, f64) = (15.0, 85.0);
}

/// Specification documents in the accepted input formats.
pub mod specs {
    /// Ten-day build with one temporal and one static provider.
    pub const SMALL_YAML: &str = r#"
lon_lat: [10.0, 45.0]
xy_shape: [4, 4]
resolution: 100.0
time_interval: "2021-06-01/2021-06-10"
providers:
  - name: s2
    kwargs:
      bands: [B02, B03, B04]
  - name: srtm
"#;

    /// The same build expressed as JSON with a date pair.
    pub const SMALL_JSON: &str = r#"{
  "lon_lat": [10.0, 45.0],
  "xy_shape": [4, 4],
  "resolution": 100.0,
  "time_interval": ["2021-06-01", "2021-06-10"],
  "providers": [{"name": "s2", "kwargs": {"bands": ["B02", "B03", "B04"]}}, {"name": "srtm"}]
}"#;

    /// Resolution must be positive.
    pub const INVALID_RESOLUTION_YAML: &str = r#"
lon_lat: [10.0, 45.0]
xy_shape: [4, 4]
resolution: -30.0
time_interval: "2021-06-01/2021-06-10"
providers:
  - name: s2
"#;
}
