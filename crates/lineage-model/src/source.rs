//! Bibliographic records: sources, repositories, and the top-level note and
//! image records that other entities cite by key.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::container::EventContainer;
use crate::event::Event;
use crate::references::{ImageLink, NoteLink, ReferenceContainer, References};

/// A `SOUR.REPO` link: a repository key and/or an in-line repository name,
/// with the call number the source is filed under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub key: Option<String>,
    pub name: Option<String>,
    pub call_number: Option<String>,
    pub media: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Source {
    pub key: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub publication: Option<String>,
    pub abbreviation: Option<String>,
    pub call_number: Option<String>,
    pub text: Option<String>,
    pub agency: Option<String>,
    pub repositories: Vec<RepositoryRef>,
    /// Filled in from the referenced repository records during resolution.
    pub repository_name: Option<String>,
    pub repository_address: Option<String>,
    pub events: BTreeSet<Event>,
    pub refs: References,
}

fn normalize(value: &Option<String>) -> String {
    value
        .as_deref()
        .unwrap_or("")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl Source {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Sets a bibliographic field from its tag; returns false for tags that
    /// are not source fields.
    pub fn set_field(&mut self, tag: &str, value: &str) -> bool {
        let slot = match tag {
            "TITL" => &mut self.title,
            "AUTH" => &mut self.author,
            "PUBL" => &mut self.publication,
            "ABBR" => &mut self.abbreviation,
            "CALN" => &mut self.call_number,
            "TEXT" => &mut self.text,
            "AGNC" => &mut self.agency,
            _ => return false,
        };
        let value = value.trim();
        if value.is_empty() {
            return true;
        }
        match slot {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(value);
            }
            None => *slot = Some(value.to_string()),
        }
        true
    }

    /// Normalized field content used for structural deduplication: every
    /// bibliographic field, repository link and note identity, whitespace
    /// collapsed and case folded. The key is deliberately not part of it.
    pub fn fingerprint(&self) -> String {
        let mut parts = vec![
            normalize(&self.title),
            normalize(&self.author),
            normalize(&self.publication),
            normalize(&self.abbreviation),
            normalize(&self.call_number),
            normalize(&self.text),
            normalize(&self.agency),
        ];
        for repo in &self.repositories {
            parts.push(format!(
                "repo:{}|{}|{}|{}",
                normalize(&repo.key),
                normalize(&repo.name),
                normalize(&repo.call_number),
                normalize(&repo.media)
            ));
        }
        for note in &self.refs.notes {
            parts.push(format!("note:{}", note.identity().trim().to_lowercase()));
        }
        for image in &self.refs.images {
            if let ImageLink::Key { key } = image {
                parts.push(format!("image:{key}"));
            }
        }
        parts.join("\u{1f}")
    }
}

impl ReferenceContainer for Source {
    fn references(&self) -> &References {
        &self.refs
    }

    fn references_mut(&mut self) -> &mut References {
        &mut self.refs
    }
}

impl EventContainer for Source {
    fn events(&self) -> &BTreeSet<Event> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut BTreeSet<Event> {
        &mut self.events
    }
}

// ============================================================================
// Repository
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Repository {
    pub key: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub www: Option<String>,
    pub refs: References,
}

impl Repository {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn set_field(&mut self, tag: &str, value: &str) -> bool {
        let slot = match tag {
            "NAME" => &mut self.name,
            "ADDR" => &mut self.address,
            "PHON" => &mut self.phone,
            "EMAIL" => &mut self.email,
            "WWW" => &mut self.www,
            _ => return false,
        };
        let value = value.trim();
        if !value.is_empty() && slot.is_none() {
            *slot = Some(value.to_string());
        }
        true
    }
}

impl ReferenceContainer for Repository {
    fn references(&self) -> &References {
        &self.refs
    }

    fn references_mut(&mut self) -> &mut References {
        &mut self.refs
    }
}

// ============================================================================
// Top-level notes and images
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Note {
    pub key: String,
    pub text: String,
    pub refs: References,
}

impl Note {
    pub fn link(&self) -> NoteLink {
        NoteLink::Key(self.key.clone())
    }
}

impl ReferenceContainer for Note {
    fn references(&self) -> &References {
        &self.refs
    }

    fn references_mut(&mut self) -> &mut References {
        &mut self.refs
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Image {
    pub key: String,
    pub file: Option<String>,
    pub title: Option<String>,
    pub format: Option<String>,
    pub refs: References,
}

impl ReferenceContainer for Image {
    fn references(&self) -> &References {
        &self.refs
    }

    fn references_mut(&mut self) -> &mut References {
        &mut self.refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_ignores_key_case_and_spacing() {
        let mut a = Source::new("S1");
        a.set_field("TITL", "Parish  Register of   Ely");
        a.set_field("AUTH", "Church of England");
        let mut b = Source::new("S2");
        b.set_field("TITL", "parish register of ely");
        b.set_field("AUTH", "CHURCH OF ENGLAND ");
        assert_eq!(a.fingerprint(), b.fingerprint());

        b.set_field("PUBL", "1890");
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn repeated_source_text_is_appended() {
        let mut s = Source::new("S1");
        s.set_field("TEXT", "line one");
        s.set_field("TEXT", "line two");
        assert_eq!(s.text.as_deref(), Some("line one\nline two"));
        assert!(!s.set_field("NAME", "x"));
    }
}
