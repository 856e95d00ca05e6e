//! The "reference container" capability: notes, citations and images owned
//! in-line or by key, plus the bucket of text captured from tags the parser
//! chose not to model.

use serde::{Deserialize, Serialize};

// ============================================================================
// Links
// ============================================================================

/// A note attached to an owner, either carried in-line or cited by the key of
/// a top-level note record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum NoteLink {
    Inline(String),
    Key(String),
}

impl NoteLink {
    /// Identity used by citation equality: the key, or the text itself.
    pub fn identity(&self) -> &str {
        match self {
            NoteLink::Inline(text) | NoteLink::Key(text) => text,
        }
    }
}

/// An image attached to an owner: a file reference or the key of a top-level
/// image record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageLink {
    File {
        path: String,
        title: Option<String>,
        format: Option<String>,
    },
    Key {
        key: String,
    },
}

// ============================================================================
// References
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct References {
    pub notes: Vec<NoteLink>,
    pub citations: Vec<Citation>,
    pub images: Vec<ImageLink>,
    /// Human-readable lines (`Label: text`) captured from unmodeled tags.
    pub ignored: Vec<String>,
}

impl References {
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
            && self.citations.is_empty()
            && self.images.is_empty()
            && self.ignored.is_empty()
    }

    /// Union `other` into `self`, skipping entries already present.
    pub fn merge(&mut self, other: References) {
        for note in other.notes {
            if !self.notes.contains(&note) {
                self.notes.push(note);
            }
        }
        for citation in other.citations {
            self.absorb_citation(citation);
        }
        for image in other.images {
            if !self.images.contains(&image) {
                self.images.push(image);
            }
        }
        self.ignored.extend(other.ignored);
    }

    /// Attaches a citation. An equal citation already present takes over the
    /// newcomer's notes, images and captured lines instead.
    pub fn absorb_citation(&mut self, citation: Citation) {
        match self.citations.iter_mut().find(|c| **c == citation) {
            Some(existing) => {
                let mut refs = citation.refs;
                refs.ignored
                    .retain(|line| !existing.refs.ignored.contains(line));
                existing.refs.merge(refs);
            }
            None => self.citations.push(citation),
        }
    }
}

/// Shared behavior for anything that can own notes, citations and images.
pub trait ReferenceContainer {
    fn references(&self) -> &References;
    fn references_mut(&mut self) -> &mut References;

    fn add_note(&mut self, text: &str) {
        let text = text.trim_end();
        if !text.trim().is_empty() {
            self.references_mut()
                .notes
                .push(NoteLink::Inline(text.to_string()));
        }
    }

    fn add_note_ref(&mut self, key: &str) {
        let link = NoteLink::Key(key.to_string());
        let refs = self.references_mut();
        if !refs.notes.contains(&link) {
            refs.notes.push(link);
        }
    }

    /// Adds a citation, folding it into an equal one already attached.
    fn add_citation(&mut self, citation: Citation) {
        self.references_mut().absorb_citation(citation);
    }

    fn add_image(&mut self, image: ImageLink) {
        let refs = self.references_mut();
        if !refs.images.contains(&image) {
            refs.images.push(image);
        }
    }

    fn add_ignored(&mut self, line: String) {
        self.references_mut().ignored.push(line);
    }

    fn citation_count(&self) -> usize {
        self.references().citations.len()
    }

    /// Free text as the renderer sees it: in-line notes followed by captured
    /// lines, one per line.
    fn rendered_text(&self) -> String {
        let refs = self.references();
        refs.notes
            .iter()
            .filter_map(|n| match n {
                NoteLink::Inline(text) => Some(text.as_str()),
                NoteLink::Key(_) => None,
            })
            .chain(refs.ignored.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ============================================================================
// Citation
// ============================================================================

/// A reference to a source (by key, or described in-line by `title`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Citation {
    pub source_key: Option<String>,
    pub title: Option<String>,
    pub page: Option<String>,
    pub date: Option<String>,
    pub quality: Option<String>,
    pub text: Option<String>,
    pub refs: References,
}

impl Citation {
    pub fn to_source(key: &str) -> Self {
        Self {
            source_key: Some(key.to_string()),
            ..Self::default()
        }
    }

    pub fn inline(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    fn note_identities(&self) -> impl Iterator<Item = &str> {
        self.refs.notes.iter().map(NoteLink::identity)
    }
}

impl PartialEq for Citation {
    fn eq(&self, other: &Self) -> bool {
        self.source_key == other.source_key
            && self.title == other.title
            && self.page == other.page
            && self.date == other.date
            && self.quality == other.quality
            && self.text == other.text
            && self.note_identities().eq(other.note_identities())
    }
}

impl Eq for Citation {}

impl ReferenceContainer for Citation {
    fn references(&self) -> &References {
        &self.refs
    }

    fn references_mut(&mut self) -> &mut References {
        &mut self.refs
    }
}
