//! Lineage record graph
//!
//! Strongly typed entities for genealogical data ingested from interchange
//! files:
//! - People, families, life events, sources, repositories, notes, images
//! - Two narrow capabilities shared across entities: [`ReferenceContainer`]
//!   (notes/citations/images in-line or by key) and [`EventContainer`]
//!   (an ordered event set plus citation/note numbering)
//! - Fuzzy dates behind the [`DateInterpreter`] seam
//! - The event and person comparators
//!
//! This crate holds data and lifecycle rules only; parsing lives in
//! `lineage-ingest-gedcom` and graph repair in `lineage-resolve`.

pub mod compare;
pub mod container;
pub mod date;
pub mod event;
pub mod family;
pub mod graph;
pub mod person;
pub mod references;
pub mod source;

pub use compare::{birth_sort_key, compare_people};
pub use container::{EventContainer, ReferenceNumbers};
pub use date::{DateError, DateInterpreter, FuzzyDate, GedcomDateInterpreter};
pub use event::{Event, EventAttribute, EventKind, EventScope};
pub use family::{Child, Family, SpouseRef, SpouseRole};
pub use graph::{GraphStats, Insert, RecordGraph};
pub use person::{Gender, LivingStatus, Name, Person};
pub use references::{Citation, ImageLink, NoteLink, ReferenceContainer, References};
pub use source::{Image, Note, Repository, RepositoryRef, Source};

/// Normalizes a cross-reference (`@I12@`, ` I12 `) to its bare key.
pub fn normalize_key(raw: &str) -> Option<String> {
    let key = raw.trim().trim_matches('@').trim();
    (!key.is_empty()).then(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_lose_at_signs() {
        assert_eq!(normalize_key("@I12@"), Some("I12".to_string()));
        assert_eq!(normalize_key(" F3 "), Some("F3".to_string()));
        assert_eq!(normalize_key("@@"), None);
    }
}
