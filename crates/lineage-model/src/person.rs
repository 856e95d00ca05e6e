use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::container::EventContainer;
use crate::event::Event;
use crate::references::{ReferenceContainer, References};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    pub fn from_sex(value: &str) -> Gender {
        match value.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('M') => Gender::Male,
            Some('F') => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LivingStatus {
    #[default]
    Unknown,
    Living,
    Dead,
}

// ============================================================================
// Name
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub given: Option<String>,
    pub surname: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub nickname: Option<String>,
    pub surname_prefix: Option<String>,
    pub name_type: Option<String>,
    pub refs: References,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.split_whitespace().collect::<Vec<_>>().join(" ");
    (!s.is_empty()).then_some(s)
}

impl Name {
    /// Parses a `NAME` value of the form `Given /Surname/ Suffix`.
    pub fn parse(value: &str) -> Name {
        let mut name = Name::default();
        match value.split_once('/') {
            Some((given, rest)) => {
                let (surname, suffix) = rest.split_once('/').unwrap_or((rest, ""));
                name.given = non_empty(given);
                name.surname = non_empty(surname);
                name.suffix = non_empty(suffix);
            }
            None => name.given = non_empty(value),
        }
        name
    }

    pub fn is_empty(&self) -> bool {
        self.given.is_none() && self.surname.is_none()
    }

    /// Sets a part from an explicit sub-tag, overriding the parsed value.
    pub fn set_part(&mut self, tag: &str, value: &str) -> bool {
        let slot = match tag {
            "GIVN" => &mut self.given,
            "SURN" => &mut self.surname,
            "NPFX" => &mut self.prefix,
            "NSFX" => &mut self.suffix,
            "NICK" => &mut self.nickname,
            "SPFX" => &mut self.surname_prefix,
            "TYPE" => &mut self.name_type,
            _ => return false,
        };
        if let Some(v) = non_empty(value) {
            *slot = Some(v);
        }
        true
    }

    pub fn full_name(&self) -> String {
        [
            self.prefix.as_deref(),
            self.given.as_deref(),
            self.surname_prefix.as_deref(),
            self.surname.as_deref(),
            self.suffix.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Privacy placeholder names such as `Living /Smith/`.
    pub fn is_living_placeholder(&self) -> bool {
        let is_living = |s: &Option<String>| {
            s.as_deref()
                .is_some_and(|v| v.eq_ignore_ascii_case("living"))
        };
        is_living(&self.given) || is_living(&self.surname)
    }
}

impl ReferenceContainer for Name {
    fn references(&self) -> &References {
        &self.refs
    }

    fn references_mut(&mut self) -> &mut References {
        &mut self.refs
    }
}

// ============================================================================
// Person
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    key: String,
    gender: Gender,
    living: LivingStatus,
    name: Option<Name>,
    alt_names: Vec<Name>,
    child_of: BTreeSet<String>,
    spouse_of: BTreeSet<String>,
    /// `FAMC.PEDI` values by family key, carried onto the family's child
    /// record during resolution.
    pedigrees: BTreeMap<String, String>,
    events: BTreeSet<Event>,
    born_before_cutoff: bool,
    refs: References,
}

impl Person {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            gender: Gender::Unknown,
            living: LivingStatus::Unknown,
            name: None,
            alt_names: Vec::new(),
            child_of: BTreeSet::new(),
            spouse_of: BTreeSet::new(),
            pedigrees: BTreeMap::new(),
            events: BTreeSet::new(),
            born_before_cutoff: false,
            refs: References::default(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.gender = gender;
    }

    pub fn living_status(&self) -> LivingStatus {
        self.living
    }

    /// Moves the status out of `Unknown`. Settled statuses never change and
    /// nothing reverts to `Unknown`; returns whether the status changed.
    pub fn set_living_status(&mut self, status: LivingStatus) -> bool {
        if self.living != LivingStatus::Unknown || status == LivingStatus::Unknown {
            return false;
        }
        self.living = status;
        true
    }

    /// The first name added becomes primary; later ones are alternates.
    pub fn add_name(&mut self, name: Name) {
        if self.name.is_none() {
            self.name = Some(name);
        } else if self.name.as_ref() != Some(&name) && !self.alt_names.contains(&name) {
            self.alt_names.push(name);
        }
    }

    pub fn name(&self) -> Option<&Name> {
        self.name.as_ref()
    }

    pub fn alt_names(&self) -> &[Name] {
        &self.alt_names
    }

    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.name.iter().chain(self.alt_names.iter())
    }

    pub fn names_mut(&mut self) -> impl Iterator<Item = &mut Name> {
        self.name.iter_mut().chain(self.alt_names.iter_mut())
    }

    pub fn child_of_families(&self) -> &BTreeSet<String> {
        &self.child_of
    }

    pub fn spouse_of_families(&self) -> &BTreeSet<String> {
        &self.spouse_of
    }

    pub fn add_child_of(&mut self, family: &str) -> bool {
        self.child_of.insert(family.to_string())
    }

    pub fn add_spouse_of(&mut self, family: &str) -> bool {
        self.spouse_of.insert(family.to_string())
    }

    pub fn remove_child_of(&mut self, family: &str) -> bool {
        self.pedigrees.remove(family);
        self.child_of.remove(family)
    }

    pub fn remove_spouse_of(&mut self, family: &str) -> bool {
        self.spouse_of.remove(family)
    }

    pub fn pedigree(&self, family: &str) -> Option<&str> {
        self.pedigrees.get(family).map(String::as_str)
    }

    pub fn set_pedigree(&mut self, family: &str, pedigree: &str) {
        let pedigree = pedigree.trim();
        if !pedigree.is_empty() {
            self.pedigrees
                .insert(family.to_string(), pedigree.to_string());
        }
    }

    pub fn is_born_before_cutoff(&self) -> bool {
        self.born_before_cutoff
    }

    pub fn mark_born_before_cutoff(&mut self) -> bool {
        !std::mem::replace(&mut self.born_before_cutoff, true)
    }

    /// Folds a second record with the same key into this one.
    pub fn merge_from(&mut self, other: Person) {
        if self.gender == Gender::Unknown {
            self.gender = other.gender;
        }
        for name in other.name.into_iter().chain(other.alt_names) {
            self.add_name(name);
        }
        self.child_of.extend(other.child_of);
        self.spouse_of.extend(other.spouse_of);
        for (family, pedigree) in other.pedigrees {
            self.pedigrees.entry(family).or_insert(pedigree);
        }
        for event in other.events {
            self.add_event(event);
        }
        self.refs.merge(other.refs);
    }
}

impl ReferenceContainer for Person {
    fn references(&self) -> &References {
        &self.refs
    }

    fn references_mut(&mut self) -> &mut References {
        &mut self.refs
    }
}

impl EventContainer for Person {
    fn events(&self) -> &BTreeSet<Event> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut BTreeSet<Event> {
        &mut self.events
    }

    fn nested_references(&self) -> Vec<&References> {
        self.names().map(|n| &n.refs).collect()
    }
}
