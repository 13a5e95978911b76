//! Grid planning, chunking and encoding properties over many inputs.

mod common;

use chrono::{Duration, NaiveDate};
use common::{registry_with, spec, MockProvider};
use cube_common::InterpolationPolicy::{Linear, Nearest};
use minicuber::{
    compute_bbox, compute_grid, compute_padded_bbox, AssemblerConfig, CubeAssembler,
    EncodingConfig, EncodingPlanner, TimeChunker, VariableEncoding,
};

fn sample_locations() -> Vec<(f64, f64)> {
    let mut points = Vec::new();
    for lon in (-175..=175).step_by(35) {
        for lat in (-75..=80).step_by(31) {
            points.push((lon as f64 + 0.37, lat as f64 + 0.11));
        }
    }
    points
}

#[test]
fn test_grid_determinism_everywhere() {
    for (lon, lat) in sample_locations() {
        for (nx, ny) in [(1, 1), (4, 4), (5, 3), (128, 128)] {
            let a = compute_bbox(lon, lat, nx, ny, 20.0).unwrap();
            let b = compute_bbox(lon, lat, nx, ny, 20.0).unwrap();
            assert_eq!(a, b);

            let grid = compute_grid(&a, nx, ny);
            assert_eq!(grid, compute_grid(&b, nx, ny));
            assert_eq!(grid.lon.len(), nx);
            assert_eq!(grid.lat.len(), ny);
            assert!(grid.lon.windows(2).all(|w| w[1] > w[0]));
            assert!(grid.lat.windows(2).all(|w| w[1] < w[0]));
        }
    }
}

#[test]
fn test_padding_superset_everywhere() {
    for (lon, lat) in sample_locations() {
        for (nx, ny) in [(2, 2), (4, 4), (33, 17)] {
            let bbox = compute_bbox(lon, lat, nx, ny, 30.0).unwrap();
            let padded = compute_padded_bbox(lon, lat, nx, ny, 30.0, 6.0).unwrap();
            assert!(padded.min_lon <= bbox.min_lon);
            assert!(padded.min_lat <= bbox.min_lat);
            assert!(padded.max_lon >= bbox.max_lon);
            assert!(padded.max_lat >= bbox.max_lat);
        }
    }
}

#[test]
fn test_chunks_respect_configured_minimum() {
    let chunker = TimeChunker::new(AssemblerConfig::default().min_chunk_days);
    let start = NaiveDate::from_ymd_opt(2017, 3, 17).unwrap();
    let end = NaiveDate::from_ymd_opt(2022, 9, 3).unwrap();

    let chunks: Vec<_> = chunker.split(start, end).collect();
    assert_eq!(chunks.first().unwrap().start, start);
    assert_eq!(chunks.last().unwrap().end, end);
    for pair in chunks.windows(2) {
        assert_eq!(pair[0].end_exclusive(), pair[1].start);
    }
    assert!(chunks.iter().all(|c| c.days() >= 15));
    let covered: i64 = chunks.iter().map(|c| c.days()).sum();
    assert_eq!(covered, (end - start).num_days() + 1);
    assert_eq!(chunks[1].start, start + Duration::days(15));
}

#[tokio::test]
async fn test_encoding_plan_for_built_cube() {
    let s2 = MockProvider::temporal("s2").with_bands(&[("B04", Linear), ("scl", Nearest)]);
    let srtm = MockProvider::static_layer("srtm").with_bands(&[("dem", Linear)]);

    let cube = CubeAssembler::new(registry_with(&[s2, srtm]), AssemblerConfig::default())
        .build(&spec("2021-06-01/2021-06-10", &["s2", "srtm"]))
        .await
        .unwrap();

    let mut cube = cube;
    let dem = cube
        .variables
        .iter_mut()
        .find(|v| v.name() == "srtm_dem")
        .unwrap();
    for (i, v) in dem.data.iter_mut().enumerate() {
        *v = 100.0 + i as f32;
    }

    let plan = EncodingPlanner::new(EncodingConfig::default()).plan_cube(&cube);
    let names: Vec<_> = plan.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["s2_B04", "s2_scl", "srtm_dem"]);

    // Constant reflectance cannot be quantized, the class layer is never quantized
    assert!(plan[0].1.is_lossless());
    assert!(plan[1].1.is_lossless());
    assert!(matches!(plan[2].1, VariableEncoding::Quantized { bits: 16, .. }));
}
