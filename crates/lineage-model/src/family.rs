use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::container::EventContainer;
use crate::event::Event;
use crate::references::{ReferenceContainer, References};

/// A husband or wife slot. Preferred spouses are kept at the front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpouseRef {
    pub key: String,
    pub preferred: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub key: String,
    pub adopted: bool,
    pub status: Option<String>,
}

impl Child {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            adopted: false,
            status: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpouseRole {
    Husband,
    Wife,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
    key: String,
    husbands: Vec<SpouseRef>,
    wives: Vec<SpouseRef>,
    children: Vec<Child>,
    events: BTreeSet<Event>,
    refs: References,
}

fn add_spouse(list: &mut Vec<SpouseRef>, key: &str, preferred: bool) -> bool {
    if let Some(pos) = list.iter().position(|s| s.key == key) {
        if preferred && !list[pos].preferred {
            let mut spouse = list.remove(pos);
            spouse.preferred = true;
            list.insert(0, spouse);
        }
        return false;
    }
    let spouse = SpouseRef {
        key: key.to_string(),
        preferred,
    };
    if preferred {
        list.insert(0, spouse);
    } else {
        list.push(spouse);
    }
    true
}

impl Family {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            husbands: Vec::new(),
            wives: Vec::new(),
            children: Vec::new(),
            events: BTreeSet::new(),
            refs: References::default(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn husbands(&self) -> &[SpouseRef] {
        &self.husbands
    }

    pub fn wives(&self) -> &[SpouseRef] {
        &self.wives
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn spouse_keys(&self) -> impl Iterator<Item = &str> {
        self.husbands
            .iter()
            .chain(self.wives.iter())
            .map(|s| s.key.as_str())
    }

    pub fn child_keys(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|c| c.key.as_str())
    }

    pub fn add_spouse(&mut self, role: SpouseRole, key: &str, preferred: bool) -> bool {
        match role {
            SpouseRole::Husband => add_spouse(&mut self.husbands, key, preferred),
            SpouseRole::Wife => add_spouse(&mut self.wives, key, preferred),
        }
    }

    pub fn add_husband(&mut self, key: &str, preferred: bool) -> bool {
        self.add_spouse(SpouseRole::Husband, key, preferred)
    }

    pub fn add_wife(&mut self, key: &str, preferred: bool) -> bool {
        self.add_spouse(SpouseRole::Wife, key, preferred)
    }

    /// Adds a child, or merges adoption/status flags into an existing entry.
    pub fn add_child(&mut self, child: Child) -> bool {
        if let Some(existing) = self.children.iter_mut().find(|c| c.key == child.key) {
            existing.adopted |= child.adopted;
            if existing.status.is_none() {
                existing.status = child.status;
            }
            return false;
        }
        self.children.push(child);
        true
    }

    pub fn child_mut(&mut self, key: &str) -> Option<&mut Child> {
        self.children.iter_mut().find(|c| c.key == key)
    }

    pub fn has_spouse(&self, key: &str) -> bool {
        self.spouse_keys().any(|k| k == key)
    }

    pub fn has_child(&self, key: &str) -> bool {
        self.children.iter().any(|c| c.key == key)
    }

    pub fn remove_spouse(&mut self, key: &str) -> bool {
        let before = self.husbands.len() + self.wives.len();
        self.husbands.retain(|s| s.key != key);
        self.wives.retain(|s| s.key != key);
        before != self.husbands.len() + self.wives.len()
    }

    pub fn remove_child(&mut self, key: &str) -> bool {
        let before = self.children.len();
        self.children.retain(|c| c.key != key);
        before != self.children.len()
    }

    /// The first still-empty spouse slot, husband first.
    pub fn open_spouse_slot(&self) -> Option<SpouseRole> {
        if self.husbands.is_empty() {
            Some(SpouseRole::Husband)
        } else if self.wives.is_empty() {
            Some(SpouseRole::Wife)
        } else {
            None
        }
    }

    pub fn merge_from(&mut self, other: Family) {
        for s in other.husbands {
            self.add_husband(&s.key, s.preferred);
        }
        for s in other.wives {
            self.add_wife(&s.key, s.preferred);
        }
        for c in other.children {
            self.add_child(c);
        }
        for e in other.events {
            self.add_event(e);
        }
        self.refs.merge(other.refs);
    }
}

impl ReferenceContainer for Family {
    fn references(&self) -> &References {
        &self.refs
    }

    fn references_mut(&mut self) -> &mut References {
        &mut self.refs
    }
}

impl EventContainer for Family {
    fn events(&self) -> &BTreeSet<Event> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut BTreeSet<Event> {
        &mut self.events
    }
}
