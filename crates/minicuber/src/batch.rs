//! Concurrent builds of independent specifications.

use cube_common::Cube;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::assembler::CubeAssembler;
use crate::error::Result;
use crate::spec::Specification;

/// Build every specification, running up to `concurrency` builds at once.
///
/// Builds share nothing but the assembler's registry and config; each
/// result is returned in input order so failures can be attributed to
/// their specification.
pub async fn build_batch(
    assembler: &CubeAssembler,
    specs: &[Specification],
    concurrency: usize,
) -> Vec<Result<Cube>> {
    let concurrency = concurrency.max(1);
    info!(builds = specs.len(), concurrency, "Starting batch");

    let results: Vec<Result<Cube>> = stream::iter(specs)
        .map(|spec| assembler.build(spec))
        .buffered(concurrency)
        .collect()
        .await;

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        warn!(failed, total = results.len(), "Batch finished with failed builds");
    } else {
        info!(total = results.len(), "Batch finished");
    }
    results
}
