//! GEDCOM ingestion for Lineage
//!
//! Two layers:
//! - [`lexer`]: `LEVEL [@XREF@] TAG [VALUE]` lines to a balanced
//!   open/close/text [`TagEvent`] stream
//! - [`automaton`]: a tag-stack automaton driven by the
//!   `(parent context, tag)` [`rules`] table that builds a
//!   [`RecordGraph`](lineage_model::RecordGraph)
//!
//! The automaton only sees events, so any adapter that can produce the same
//! stream (an XML reader, a test fixture) can reuse it.
//!
//! ```
//! use lineage_ingest_gedcom::{parse_gedcom, ParserConfig};
//!
//! let text = "0 HEAD\n0 @I1@ INDI\n1 NAME Ann /Lee/\n0 TRLR\n";
//! let parsed = parse_gedcom(text, &ParserConfig::default()).unwrap();
//! assert_eq!(parsed.graph.stats().people, 1);
//! ```

pub mod automaton;
pub mod config;
pub mod error;
pub mod event;
pub mod lexer;
pub mod report;
pub mod rules;
pub mod schema;
pub mod synonyms;
pub mod temple;

use std::path::Path;

pub use automaton::{ParsedFile, TagStackAutomaton};
pub use config::{ParserConfig, ParserSettings};
pub use error::{ParseError, Result};
pub use event::TagEvent;
pub use report::{Diagnostic, ParseReport, Severity};
pub use rules::{Action, Context, Rule, RuleTable};

/// Runs the automaton over an already-lexed event stream.
pub fn parse_events<I>(events: I, config: &ParserConfig) -> Result<ParsedFile>
where
    I: IntoIterator<Item = TagEvent>,
{
    let mut automaton = TagStackAutomaton::new(config);
    for event in events {
        automaton.feed(event)?;
    }
    automaton.finish()
}

/// Lexes and parses GEDCOM text.
pub fn parse_gedcom(text: &str, config: &ParserConfig) -> Result<ParsedFile> {
    let lexed = lexer::tag_events(text);
    let mut automaton = TagStackAutomaton::new(config);
    for warning in lexed.warnings {
        automaton
            .report_mut()
            .warn(Some(warning.line), None, warning.message);
    }
    for event in lexed.events {
        automaton.feed(event)?;
    }
    let parsed = automaton.finish()?;
    let stats = parsed.graph.stats();
    tracing::info!(
        people = stats.people,
        families = stats.families,
        sources = stats.sources,
        warnings = parsed.report.warnings,
        "parsed GEDCOM"
    );
    Ok(parsed)
}

/// Reads a file (lossy UTF-8) and parses it.
pub fn parse_file(path: &Path, config: &ParserConfig) -> Result<ParsedFile> {
    let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read GEDCOM file");
    parse_gedcom(&text, config)
}
