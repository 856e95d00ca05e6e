//! Per-file custom event tags declared under `HEAD.SCHEMA`.
//!
//! ```text
//! 1 SCHEMA
//! 2 INDI
//! 3 _DNA
//! 4 LABL DNA test
//! ```
//!
//! declares `_DNA` as a person event labeled "DNA test". The table lives
//! with one parse and is never shared between files.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaScope {
    Person,
    Family,
}

impl SchemaScope {
    pub fn from_record_tag(tag: &str) -> Option<SchemaScope> {
        match tag {
            "INDI" => Some(SchemaScope::Person),
            "FAM" => Some(SchemaScope::Family),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CustomTagSchema {
    labels: HashMap<(SchemaScope, String), String>,
}

impl CustomTagSchema {
    pub fn declare(&mut self, scope: SchemaScope, tag: &str, label: &str) {
        let label = label.trim();
        let label = if label.is_empty() { tag } else { label };
        self.labels
            .insert((scope, tag.to_string()), label.to_string());
    }

    pub fn label(&self, scope: SchemaScope, tag: &str) -> Option<&str> {
        self.labels
            .get(&(scope, tag.to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
