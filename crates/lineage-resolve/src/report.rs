use serde::Serialize;

use crate::error::ResolutionError;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionReport {
    pub errors: Vec<ResolutionError>,
    /// Reverse links added (family to person or person to family).
    pub repaired_links: usize,
    pub removed_dangling: usize,
    pub folded_sources: usize,
    pub merged_repositories: usize,
    pub duplicate_families: Vec<(String, String)>,
    pub inconsistent_birth_bounds: usize,
    pub living: usize,
    pub dead: usize,
    /// Worklist pops of the living fixed point.
    pub living_iterations: usize,
    pub born_before_cutoff: usize,
}

impl ResolutionReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub(crate) fn error(&mut self, error: ResolutionError) {
        tracing::warn!(error = %error, "resolution problem");
        self.errors.push(error);
    }
}
