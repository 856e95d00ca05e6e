//! Resolution passes over a parsed Lineage record graph
//!
//! Runs in a fixed order, single-threaded, against one file's graph:
//! 1. [`references`]: reverse-link repair, dangling-reference removal,
//!    source folding and repository merge
//! 2. [`duplicates`]: same-couple family detection (report only)
//! 3. [`living`]: three-pass living-status inference
//! 4. [`cutoff`]: born-before-cutoff propagation
//!
//! Recoverable problems are collected on the [`ResolutionReport`]; no pass
//! aborts.

pub mod config;
pub mod cutoff;
pub mod duplicates;
pub mod error;
pub mod living;
pub mod quality;
pub mod references;
pub mod report;

pub use config::ResolveConfig;
pub use cutoff::propagate_cutoff;
pub use duplicates::detect_duplicate_families;
pub use error::ResolutionError;
pub use living::{classify, infer_living, LivingSummary};
pub use quality::{birth_bounds, latest_birth_year, BirthBounds};
pub use references::resolve_references;
pub use report::ResolutionReport;

use lineage_model::RecordGraph;

pub fn resolve(graph: &mut RecordGraph, config: &ResolveConfig) -> ResolutionReport {
    let mut report = ResolutionReport::default();

    resolve_references(graph, &mut report);
    report.duplicate_families = detect_duplicate_families(graph);
    report.inconsistent_birth_bounds = graph
        .people
        .values()
        .filter(|p| !birth_bounds(graph, p, config).is_consistent())
        .count();

    let living = infer_living(graph, config);
    report.living = living.living;
    report.dead = living.dead;
    report.living_iterations = living.iterations;

    report.born_before_cutoff = propagate_cutoff(graph, config);

    tracing::info!(
        repaired = report.repaired_links,
        dangling = report.removed_dangling,
        folded_sources = report.folded_sources,
        errors = report.errors.len(),
        "graph resolved"
    );
    report
}
