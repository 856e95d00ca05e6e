//! Per-file parse diagnostics.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: Option<usize>,
    pub tag: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseReport {
    pub warnings: usize,
    /// Set whenever a tag with no rule was seen, regardless of whether it
    /// counted as a warning.
    pub had_unknown_tag: bool,
    pub unknown_tags: usize,
    /// Program named in `HEAD.SOUR`.
    pub source_program: Option<String>,
    pub custom_tags: usize,
    pub merged_records: usize,
    pub dropped_records: usize,
    /// Captured text that had no modeled frame to land on.
    pub orphaned_text: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseReport {
    pub fn warn(&mut self, line: Option<usize>, tag: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(line = ?line, tag = ?tag, "{message}");
        self.warnings += 1;
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            line,
            tag: tag.map(str::to_string),
            message,
        });
    }

    pub fn info(&mut self, line: Option<usize>, tag: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(line = ?line, tag = ?tag, "{message}");
        self.diagnostics.push(Diagnostic {
            severity: Severity::Info,
            line,
            tag: tag.map(str::to_string),
            message,
        });
    }

    pub fn warning_messages(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_warnings_count() {
        let mut r = ParseReport::default();
        r.info(Some(3), Some("INDI"), "merged duplicate");
        r.warn(Some(4), None, "text outside any tag");
        assert_eq!(r.warnings, 1);
        assert_eq!(r.diagnostics.len(), 2);
        assert_eq!(r.warning_messages().count(), 1);
    }
}
