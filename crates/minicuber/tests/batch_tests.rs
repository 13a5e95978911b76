//! Concurrent builds of several specifications.

mod common;

use common::{registry_with, spec, MockProvider};
use minicuber::{build_batch, AssemblerConfig, CubeAssembler, MinicuberError};
use test_utils::fixtures::location;

#[tokio::test]
async fn test_batch_results_in_input_order() {
    let s2 = MockProvider::temporal("s2");
    let srtm = MockProvider::static_layer("srtm");
    let assembler = CubeAssembler::new(
        registry_with(&[s2.clone(), srtm.clone()]),
        AssemblerConfig::default(),
    );

    let mut specs = Vec::new();
    for (lon, lat) in [location::PO_VALLEY, location::MONTPELLIER, location::NAMIBIA] {
        let mut s = spec("2021-06-01/2021-06-10", &["s2", "srtm"]);
        s.lon_lat = (lon, lat);
        specs.push(s);
    }

    let results = build_batch(&assembler, &specs, 2).await;
    assert_eq!(results.len(), 3);
    for (result, spec) in results.iter().zip(&specs) {
        let cube = result.as_ref().unwrap();
        assert_eq!(cube.provenance.as_ref().unwrap().location, spec.lon_lat);
        assert_eq!(cube.variable_names(), vec!["s2_band", "srtm_band"]);
    }
    assert_eq!(s2.call_count(), 3);
    assert_eq!(srtm.call_count(), 3);
}

#[tokio::test]
async fn test_batch_failure_is_attributed() {
    let s2 = MockProvider::temporal("s2");
    let assembler = CubeAssembler::new(registry_with(&[s2]), AssemblerConfig::default());

    let good = spec("2021-06-01/2021-06-10", &["s2"]);
    let mut bad = good.clone();
    bad.lon_lat = location::SVALBARD_NORTH;

    let results = build_batch(&assembler, &[good.clone(), bad, good], 4).await;
    assert!(results[0].is_ok());
    assert!(results[2].is_ok());
    match &results[1] {
        Err(MinicuberError::Build { location: at, .. }) => {
            assert_eq!(*at, location::SVALBARD_NORTH)
        }
        other => panic!("expected build error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_batch() {
    let assembler = CubeAssembler::new(registry_with(&[]), AssemblerConfig::default());
    assert!(build_batch(&assembler, &[], 0).await.is_empty());
}
