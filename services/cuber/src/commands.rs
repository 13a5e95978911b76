//! Subcommand implementations.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use minicuber::{AssemblerConfig, BuildPlan, Specification};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config_loader::load_specification;

/// What `plan` prints for one specification.
#[derive(Debug, Serialize)]
pub struct PlanSummary {
    pub location: (f64, f64),
    pub xy_shape: (usize, usize),
    pub resolution: f64,
    pub providers: Vec<String>,
    #[serde(flatten)]
    pub plan: BuildPlan,
}

impl PlanSummary {
    pub fn new(spec: &Specification, config: &AssemblerConfig) -> Result<Self> {
        let plan = BuildPlan::new(spec, config)?;
        Ok(Self {
            location: spec.lon_lat,
            xy_shape: spec.xy_shape,
            resolution: spec.resolution,
            providers: spec.providers.iter().map(|p| p.name.clone()).collect(),
            plan,
        })
    }
}

/// Outcome of validating one file.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub path: PathBuf,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epsg: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Load and plan `path` without contacting any provider.
pub fn plan_file(path: &PathBuf, config: &AssemblerConfig) -> Result<PlanSummary> {
    let spec = load_specification(path)?;
    let summary = PlanSummary::new(&spec, config)
        .with_context(|| format!("Planning failed: {}", path.display()))?;

    info!(
        path = %path.display(),
        epsg = summary.plan.epsg,
        chunks = summary.plan.chunks.len(),
        "Planned build"
    );
    if summary.plan.chunks.len() > config.chunk_warning_threshold {
        warn!(
            chunks = summary.plan.chunks.len(),
            "Requested interval spans many chunks, the build will be slow"
        );
    }
    Ok(summary)
}

/// Validate every file, at most `concurrency` at a time.
///
/// Reports come back in input order.
pub async fn validate_files(
    paths: Vec<PathBuf>,
    config: &AssemblerConfig,
    concurrency: usize,
) -> Vec<ValidationReport> {
    stream::iter(paths)
        .map(|path| {
            let config = config.clone();
            async move {
                let task_path = path.clone();
                let result =
                    tokio::task::spawn_blocking(move || plan_file(&task_path, &config)).await;
                match result {
                    Ok(Ok(summary)) => ValidationReport {
                        path,
                        valid: true,
                        epsg: Some(summary.plan.epsg),
                        chunks: Some(summary.plan.chunks.len()),
                        error: None,
                    },
                    Ok(Err(e)) => invalid(path, format!("{:#}", e)),
                    Err(e) => invalid(path, format!("Validation task failed: {}", e)),
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

fn invalid(path: PathBuf, error: String) -> ValidationReport {
    warn!(path = %path.display(), error = %error, "Invalid specification");
    ValidationReport {
        path,
        valid: false,
        epsg: None,
        chunks: None,
        error: Some(error),
    }
}
