use thiserror::Error;

/// Fatal parse failures. Each carries the number of warnings raised before
/// the failure so callers can still report them.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: top-level {tag} record has no identifier")]
    MissingIdentifier {
        tag: String,
        line: usize,
        warnings: usize,
    },

    #[error("close of `{found}` does not match the open tag {}", expected.as_deref().map(|t| format!("`{t}`")).unwrap_or_else(|| "(none)".to_string()))]
    UnbalancedClose {
        expected: Option<String>,
        found: String,
        warnings: usize,
    },

    #[error("{open} tag(s) still open at end of input")]
    UnclosedTags { open: usize, warnings: usize },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    pub fn warnings(&self) -> usize {
        match self {
            ParseError::MissingIdentifier { warnings, .. }
            | ParseError::UnbalancedClose { warnings, .. }
            | ParseError::UnclosedTags { warnings, .. } => *warnings,
            ParseError::Io { .. } => 0,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
