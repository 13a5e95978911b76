//! The cube assembler: drives providers through time chunks and merges
//! their regridded output into one cube.
//!
//! # Build stages
//!
//! ```text
//! Init         validate, instantiate providers, plan grid and chunks
//!   │
//! PerChunk     for each chunk, temporal providers in declaration order:
//!   │            load ─► regrid ─► namespace ─► merge into chunk cube
//!   │
//! StaticMerge  each static provider once, over the whole interval
//!   │
//! Finalize     combine chunk cubes, clip time, attach provenance
//! ```
//!
//! Provider failures are contained: a provider that fails for one chunk
//! leaves a gap for that chunk and the build carries on.

use chrono::Utc;
use cube_common::{
    BoundingBox, Cube, Provenance, ProviderKind, ProviderRecord, RegriddedCube, TargetGrid,
    TimeChunk, VariableLayout,
};
use regrid::Regridder;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::chunker::TimeChunker;
use crate::config::AssemblerConfig;
use crate::error::{MinicuberError, Result};
use crate::merge::{clip_time, merge_into, namespace};
use crate::planner::GridPlanner;
use crate::provider::{LoadRequest, Provider, ProviderRegistry};
use crate::retry::ProviderOutcome;
use crate::spec::Specification;

/// Software identity recorded in provenance.
pub const SOFTWARE_NAME: &str = "minicuber";

/// Spatial and temporal frame of one build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildPlan {
    /// Local metric CRS the box was laid out in.
    pub epsg: u32,
    pub bbox: BoundingBox,
    /// Box used for provider queries.
    pub padded_bbox: BoundingBox,
    pub grid: TargetGrid,
    pub chunks: Vec<TimeChunk>,
}

impl BuildPlan {
    /// Plan a validated specification.
    pub fn new(spec: &Specification, config: &AssemblerConfig) -> Result<Self> {
        let planner = GridPlanner::new(
            spec.lon(),
            spec.lat(),
            spec.nx(),
            spec.ny(),
            spec.resolution,
        )?;
        let chunks = TimeChunker::new(config.min_chunk_days)
            .split(spec.time_interval.start, spec.time_interval.end)
            .collect();

        Ok(Self {
            epsg: planner.epsg(),
            bbox: planner.bbox(),
            padded_bbox: planner.padded_bbox(config.padding_cells),
            grid: planner.grid(),
            chunks,
        })
    }
}

/// Mutable bookkeeping of one build.
struct BuildState {
    records: Vec<ProviderRecord>,
    /// Declaration index of the provider that first produced each variable,
    /// and the layout it was produced with.
    origin: HashMap<String, (usize, VariableLayout)>,
    interrupted: bool,
}

/// Assembles minicubes from registered providers.
///
/// Each call to [`CubeAssembler::build`] instantiates its own providers
/// and owns its grid and cube, so independent builds can run concurrently.
#[derive(Debug, Clone)]
pub struct CubeAssembler {
    registry: ProviderRegistry,
    config: AssemblerConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl CubeAssembler {
    pub fn new(registry: ProviderRegistry, config: AssemblerConfig) -> Self {
        Self {
            registry,
            config,
            cancel: None,
        }
    }

    /// Stop builds between provider calls once `flag` is set.
    ///
    /// An interrupted build still returns everything merged so far, with
    /// `provenance.interrupted` set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::SeqCst))
    }

    /// Validate a specification and plan it without instantiating providers.
    pub fn plan(&self, spec: &Specification) -> Result<BuildPlan> {
        self.config.validate()?;
        spec.validate()?;
        for provider in &spec.providers {
            if !self.registry.contains(&provider.name) {
                return Err(MinicuberError::Config(format!(
                    "unknown provider '{}'",
                    provider.name
                )));
            }
        }
        BuildPlan::new(spec, &self.config)
    }

    /// Build the cube described by `spec`.
    ///
    /// Errors are fatal for the whole build and carry its location and
    /// interval; provider-level failures only leave gaps.
    #[instrument(skip(self, spec), fields(lon = spec.lon(), lat = spec.lat(), interval = %spec.time_interval))]
    pub async fn build(&self, spec: &Specification) -> Result<Cube> {
        self.run(spec)
            .await
            .map_err(|e| e.in_build(spec.lon_lat, spec.time_interval))
    }

    async fn run(&self, spec: &Specification) -> Result<Cube> {
        // Init
        self.config.validate()?;
        spec.validate()?;
        let providers = spec
            .providers
            .iter()
            .map(|p| self.registry.create(p))
            .collect::<Result<Vec<_>>>()?;
        check_prefixes(&providers)?;
        let plan = BuildPlan::new(spec, &self.config)?;

        info!(
            providers = providers.len(),
            chunks = plan.chunks.len(),
            epsg = plan.epsg,
            bbox = %plan.bbox,
            "Starting cube build"
        );
        if plan.chunks.len() > self.config.chunk_warning_threshold {
            warn!(
                chunks = plan.chunks.len(),
                threshold = self.config.chunk_warning_threshold,
                "Requested interval spans many time chunks; temporal providers will be queried once per chunk"
            );
        }

        let regridder = Regridder::new(plan.grid.clone());
        let mut state = BuildState {
            records: providers
                .iter()
                .map(|p| ProviderRecord::new(p.name(), p.prefix(), p.kind()))
                .collect(),
            origin: HashMap::new(),
            interrupted: false,
        };
        let (temporal, statics): (Vec<usize>, Vec<usize>) =
            (0..providers.len()).partition(|&i| providers[i].kind() == ProviderKind::Temporal);

        // PerChunk
        let mut chunk_cubes = Vec::with_capacity(plan.chunks.len());
        'chunks: for chunk in &plan.chunks {
            let mut chunk_cube = Cube::empty(&plan.grid);
            for &index in &temporal {
                if self.is_cancelled() {
                    state.interrupted = true;
                    if !chunk_cube.is_empty() {
                        chunk_cubes.push(chunk_cube);
                    }
                    break 'chunks;
                }
                let request =
                    LoadRequest::temporal(plan.padded_bbox, *chunk, spec.time_interval);
                self.load_and_merge(
                    &mut chunk_cube,
                    providers[index].as_ref(),
                    index,
                    &request,
                    &regridder,
                    &mut state,
                )
                .await;
            }

            if chunk_cube.is_empty() {
                debug!(chunk = %chunk, "No provider returned data for chunk");
            } else {
                chunk_cubes.push(chunk_cube);
            }
        }

        // Finalize: chunk cubes first so earlier chunks win on repeated timestamps
        let mut cube = Cube::empty(&plan.grid);
        for (position, chunk_cube) in chunk_cubes.into_iter().enumerate() {
            let merged = merge_into(
                &mut cube,
                RegriddedCube {
                    lon: chunk_cube.lon,
                    lat: chunk_cube.lat,
                    time: Some(chunk_cube.time),
                    variables: chunk_cube.variables,
                },
            );
            if let Err(e) = merged {
                error!(chunk = position, error = %e, "Failed to combine chunk cube, leaving a gap");
            }
        }

        // StaticMerge
        for &index in &statics {
            if self.is_cancelled() {
                state.interrupted = true;
                break;
            }
            let request = LoadRequest::static_layer(plan.padded_bbox, spec.time_interval);
            self.load_and_merge(
                &mut cube,
                providers[index].as_ref(),
                index,
                &request,
                &regridder,
                &mut state,
            )
            .await;
        }

        clip_time(&mut cube, &spec.time_interval);
        let origin = &state.origin;
        cube.variables
            .sort_by_key(|v| origin.get(v.name()).map_or(usize::MAX, |(index, _)| *index));

        for record in state.records.iter().filter(|r| r.is_absent()) {
            warn!(
                provider = %record.name,
                chunks_without_data = record.chunks_without_data,
                chunks_failed = record.chunks_failed,
                "Provider returned no data; its variables are absent from the cube"
            );
        }

        cube.provenance = Some(Provenance {
            created: Utc::now(),
            software: SOFTWARE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            build_id: Uuid::new_v4(),
            location: spec.lon_lat,
            interval: spec.time_interval,
            providers: state.records,
            interrupted: state.interrupted,
        });

        if state.interrupted {
            warn!(
                variables = cube.variables.len(),
                time_steps = cube.time.len(),
                "Cube build interrupted, returning partial cube"
            );
        } else {
            info!(
                variables = cube.variables.len(),
                time_steps = cube.time.len(),
                "Cube build complete"
            );
        }

        Ok(cube)
    }

    /// One provider call: load with retries, regrid, namespace and merge.
    ///
    /// Every failure here is contained and recorded.
    #[instrument(
        skip_all,
        fields(provider = %provider.name(), window = %request.window.map_or_else(|| "static".to_string(), |c| c.to_string()))
    )]
    async fn load_and_merge(
        &self,
        target: &mut Cube,
        provider: &dyn Provider,
        index: usize,
        request: &LoadRequest,
        regridder: &Regridder,
        state: &mut BuildState,
    ) {
        let record = &mut state.records[index];

        let product = match self.config.retry.call(provider, request).await {
            ProviderOutcome::Data(product) => product,
            ProviderOutcome::NoData => {
                info!("Provider returned no data, skipping");
                record.chunks_without_data += 1;
                return;
            }
            ProviderOutcome::Failed(e) => {
                error!(error = %e, "Provider failed, leaving a gap");
                record.chunks_failed += 1;
                return;
            }
        };

        let mut regridded = match regridder.regrid(&product) {
            Ok(regridded) => regridded,
            Err(e) => {
                error!(error = %e, "Failed to regrid provider output, leaving a gap");
                record.chunks_failed += 1;
                return;
            }
        };
        namespace(&mut regridded.variables, provider.prefix(), provider.name());

        // A name owned by another provider, or seen before with another
        // layout, is dropped rather than merged over
        let received = regridded.variables.len();
        regridded.variables.retain(|variable| match state.origin.get(variable.name()) {
            Some((owner, _)) if *owner != index => {
                error!(
                    variable = %variable.name(),
                    owner = %state.records[*owner].name,
                    "Variable name already produced by another provider, dropping"
                );
                false
            }
            Some((_, layout)) if *layout != variable.layout => {
                error!(
                    variable = %variable.name(),
                    expected = ?layout,
                    actual = ?variable.layout,
                    "Variable layout changed between calls, dropping"
                );
                false
            }
            _ => true,
        });
        let record = &mut state.records[index];
        if regridded.variables.len() < received {
            record.chunks_failed += 1;
        }
        if received > 0 && regridded.variables.is_empty() {
            return;
        }

        let produced: Vec<(String, VariableLayout)> = regridded
            .variables
            .iter()
            .map(|v| (v.name().to_string(), v.layout))
            .collect();

        if let Err(e) = merge_into(target, regridded) {
            error!(error = %e, "Failed to merge provider output, leaving a gap");
            record.chunks_failed += 1;
            return;
        }

        debug!(variables = produced.len(), "Merged provider output");
        record.chunks_with_data += 1;
        for (name, layout) in produced {
            state.origin.entry(name).or_insert((index, layout));
        }
    }
}

fn check_prefixes(providers: &[Box<dyn Provider>]) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for provider in providers {
        if let Some(other) = seen.insert(provider.prefix(), provider.name()) {
            return Err(MinicuberError::Config(format!(
                "providers '{}' and '{}' share the variable prefix '{}'",
                other,
                provider.name(),
                provider.prefix()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provider::ProviderSpec;
    use async_trait::async_trait;
    use cube_common::{ProductCube, TimeInterval};
    use test_utils::{assert_approx_eq, constant_static_cube, geographic_axes};

    struct Terrain {
        prefix: String,
    }

    #[async_trait]
    impl Provider for Terrain {
        fn name(&self) -> &str {
            "terrain"
        }

        fn prefix(&self) -> &str {
            &self.prefix
        }

        fn kind(&self) -> ProviderKind {
            ProviderKind::Static
        }

        async fn load_data(
            &self,
            request: &LoadRequest,
        ) -> std::result::Result<Option<ProductCube>, ProviderError> {
            assert!(request.window.is_none());
            Ok(Some(constant_static_cube(
                geographic_axes(&request.bbox, 20, 20),
                "dem",
                250.0,
                cube_common::InterpolationPolicy::Linear,
            )))
        }
    }

    fn registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.register("terrain", |kwargs| {
            let prefix = kwargs
                .get("prefix")
                .and_then(|v| v.as_str())
                .unwrap_or("terrain")
                .to_string();
            Ok(Box::new(Terrain { prefix }) as Box<dyn Provider>)
        });
        registry
    }

    fn spec(providers: Vec<ProviderSpec>) -> Specification {
        Specification {
            lon_lat: (10.0, 45.0),
            xy_shape: (4, 4),
            resolution: 100.0,
            time_interval: TimeInterval::parse("2021-06-01/2021-06-10").unwrap(),
            providers,
        }
    }

    #[test]
    fn test_plan_padded_box_contains_box() {
        let assembler = CubeAssembler::new(registry(), AssemblerConfig::default());
        let plan = assembler.plan(&spec(vec![ProviderSpec::new("terrain")])).unwrap();
        assert_eq!(plan.epsg, 32632);
        assert!(plan.padded_bbox.contains(&plan.bbox));
        assert_eq!(plan.chunks.len(), 1);
        assert_eq!(plan.grid.len(), 16);
    }

    #[test]
    fn test_plan_rejects_unknown_provider() {
        let assembler = CubeAssembler::new(registry(), AssemblerConfig::default());
        assert!(assembler.plan(&spec(vec![ProviderSpec::new("s2")])).is_err());
    }

    #[tokio::test]
    async fn test_static_only_build() {
        let assembler = CubeAssembler::new(registry(), AssemblerConfig::default());
        let cube = assembler
            .build(&spec(vec![ProviderSpec::new("terrain")]))
            .await
            .unwrap();

        assert_eq!(cube.variable_names(), vec!["terrain_dem"]);
        assert!(cube.time.is_empty());
        assert_approx_eq!(cube.value_at("terrain_dem", 0, 3, 3).unwrap(), 250.0, 1e-3);

        let provenance = cube.provenance.unwrap();
        assert_eq!(provenance.software, SOFTWARE_NAME);
        assert_eq!(provenance.providers[0].chunks_with_data, 1);
        assert!(!provenance.interrupted);
    }

    #[tokio::test]
    async fn test_duplicate_prefix_is_config_error() {
        let assembler = CubeAssembler::new(registry(), AssemblerConfig::default());
        let err = assembler
            .build(&spec(vec![
                ProviderSpec::new("terrain"),
                ProviderSpec::new("terrain"),
            ]))
            .await
            .unwrap_err();
        assert!(err.is_config());
        assert!(matches!(err, MinicuberError::Build { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let flag = Arc::new(AtomicBool::new(true));
        let assembler =
            CubeAssembler::new(registry(), AssemblerConfig::default()).with_cancel_flag(flag);
        let cube = assembler
            .build(&spec(vec![ProviderSpec::new("terrain")]))
            .await
            .unwrap();
        assert!(cube.is_empty());
        assert!(cube.provenance.unwrap().interrupted);
    }
}
