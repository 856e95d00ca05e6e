//! The event alphabet between a format adapter and the automaton.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TagEvent {
    /// A tag opens; `id` is the record's cross-reference identifier if the
    /// line carried one.
    Open {
        name: String,
        id: Option<String>,
        line: usize,
    },
    Close {
        name: String,
    },
    /// Character data for the innermost open tag. May arrive in pieces.
    Text {
        chars: String,
    },
}

impl TagEvent {
    pub fn open(name: &str) -> Self {
        TagEvent::Open {
            name: name.to_string(),
            id: None,
            line: 0,
        }
    }

    pub fn open_record(name: &str, id: &str) -> Self {
        TagEvent::Open {
            name: name.to_string(),
            id: Some(id.to_string()),
            line: 0,
        }
    }

    pub fn close(name: &str) -> Self {
        TagEvent::Close {
            name: name.to_string(),
        }
    }

    pub fn text(chars: &str) -> Self {
        TagEvent::Text {
            chars: chars.to_string(),
        }
    }
}
