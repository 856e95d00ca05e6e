//! The record graph: one arena per entity kind, keyed by the file's native
//! identifier. Relationships are stored as keys and resolved through the
//! arena at read time.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::family::Family;
use crate::person::Person;
use crate::source::{Image, Note, Repository, Source};

/// What happened to a record handed to one of the `insert_*` methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insert {
    Inserted,
    /// The key already existed and the record was folded into it.
    Merged,
    /// The key already existed and the new record was dropped.
    Duplicate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub people: usize,
    pub families: usize,
    pub sources: usize,
    pub repositories: usize,
    pub notes: usize,
    pub images: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordGraph {
    pub people: BTreeMap<String, Person>,
    pub families: BTreeMap<String, Family>,
    pub sources: BTreeMap<String, Source>,
    pub repositories: BTreeMap<String, Repository>,
    pub notes: BTreeMap<String, Note>,
    pub images: BTreeMap<String, Image>,
    /// Source keys in the order they were first inserted.
    #[serde(default)]
    source_order: Vec<String>,
}

fn insert_or_drop<T>(map: &mut BTreeMap<String, T>, key: String, value: T) -> Insert {
    if map.contains_key(&key) {
        return Insert::Duplicate;
    }
    map.insert(key, value);
    Insert::Inserted
}

impl RecordGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    pub fn insert_person(&mut self, person: Person) -> Insert {
        match self.people.get_mut(person.key()) {
            Some(existing) => {
                existing.merge_from(person);
                Insert::Merged
            }
            None => {
                self.people.insert(person.key().to_string(), person);
                Insert::Inserted
            }
        }
    }

    pub fn insert_family(&mut self, family: Family) -> Insert {
        match self.families.get_mut(family.key()) {
            Some(existing) => {
                existing.merge_from(family);
                Insert::Merged
            }
            None => {
                self.families.insert(family.key().to_string(), family);
                Insert::Inserted
            }
        }
    }

    pub fn insert_source(&mut self, source: Source) -> Insert {
        let key = source.key.clone();
        let outcome = insert_or_drop(&mut self.sources, key.clone(), source);
        if outcome == Insert::Inserted {
            self.source_order.push(key);
        }
        outcome
    }

    pub fn insert_repository(&mut self, repository: Repository) -> Insert {
        insert_or_drop(&mut self.repositories, repository.key.clone(), repository)
    }

    pub fn insert_note(&mut self, note: Note) -> Insert {
        insert_or_drop(&mut self.notes, note.key.clone(), note)
    }

    pub fn insert_image(&mut self, image: Image) -> Insert {
        insert_or_drop(&mut self.images, image.key.clone(), image)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn person(&self, key: &str) -> Option<&Person> {
        self.people.get(key)
    }

    pub fn person_mut(&mut self, key: &str) -> Option<&mut Person> {
        self.people.get_mut(key)
    }

    pub fn family(&self, key: &str) -> Option<&Family> {
        self.families.get(key)
    }

    pub fn family_mut(&mut self, key: &str) -> Option<&mut Family> {
        self.families.get_mut(key)
    }

    pub fn source(&self, key: &str) -> Option<&Source> {
        self.sources.get(key)
    }

    /// Keys of live sources in arrival order. Sources placed in the map
    /// directly, without `insert_source`, follow in key order.
    pub fn source_keys_in_arrival_order(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.sources.len());
        let mut keys = Vec::with_capacity(self.sources.len());
        let tracked = self.source_order.iter().map(String::as_str);
        for key in tracked.chain(self.sources.keys().map(String::as_str)) {
            if self.sources.contains_key(key) && seen.insert(key) {
                keys.push(key.to_string());
            }
        }
        keys
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            people: self.people.len(),
            families: self.families.len(),
            sources: self.sources.len(),
            repositories: self.repositories.len(),
            notes: self.notes.len(),
            images: self.images.len(),
        }
    }

    // ========================================================================
    // Relatives (through existing families only)
    // ========================================================================

    /// Spouses of every family the person is a child of.
    pub fn parents_of(&self, key: &str) -> Vec<&str> {
        self.person(key)
            .into_iter()
            .flat_map(|p| p.child_of_families())
            .filter_map(|f| self.family(f))
            .flat_map(|f| f.spouse_keys())
            .filter(|k| *k != key)
            .collect()
    }

    /// Other spouses of every family the person is a spouse in.
    pub fn spouses_of(&self, key: &str) -> Vec<&str> {
        self.person(key)
            .into_iter()
            .flat_map(|p| p.spouse_of_families())
            .filter_map(|f| self.family(f))
            .flat_map(|f| f.spouse_keys())
            .filter(|k| *k != key)
            .collect()
    }

    /// Children of every family the person is a spouse in.
    pub fn children_of(&self, key: &str) -> Vec<&str> {
        self.person(key)
            .into_iter()
            .flat_map(|p| p.spouse_of_families())
            .filter_map(|f| self.family(f))
            .flat_map(|f| f.child_keys())
            .collect()
    }

    /// Other children of the person's parent families.
    pub fn siblings_of(&self, key: &str) -> Vec<&str> {
        self.person(key)
            .into_iter()
            .flat_map(|p| p.child_of_families())
            .filter_map(|f| self.family(f))
            .flat_map(|f| f.child_keys())
            .filter(|k| *k != key)
            .collect()
    }
}
