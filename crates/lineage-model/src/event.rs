//! Life events and the event comparator.
//!
//! Events are stored in ordered sets, so `Ord` here *is* the display order:
//!
//! 1. marquee kinds by a static rank (birth, marriage, christening, death,
//!    burial), ahead of every unranked kind
//! 2. fuzzy-date sort key (undated events last)
//! 3. the fixed attribute list, compared lexicographically
//! 4. kind name, description, free-text content
//! 5. citation count
//!
//! Two events compare equal only when every one of those fields is equal.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::date::FuzzyDate;
use crate::references::{ReferenceContainer, References};

// ============================================================================
// EventKind
// ============================================================================

/// Which owners an event kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope {
    Person,
    Family,
    Both,
}

macro_rules! event_kinds {
    ($( $variant:ident => ($tag:literal, $name:literal, $scope:ident) ),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum EventKind {
            $( $variant, )*
        }

        impl EventKind {
            pub const ALL: &'static [EventKind] = &[ $( EventKind::$variant, )* ];

            /// GEDCOM tag this kind is read from.
            pub fn tag(self) -> &'static str {
                match self { $( EventKind::$variant => $tag, )* }
            }

            pub fn display_name(self) -> &'static str {
                match self { $( EventKind::$variant => $name, )* }
            }

            pub fn scope(self) -> EventScope {
                match self { $( EventKind::$variant => EventScope::$scope, )* }
            }
        }
    };
}

event_kinds! {
    Birth => ("BIRT", "Birth", Person),
    Christening => ("CHR", "Christening", Person),
    Baptism => ("BAPM", "Baptism", Person),
    Death => ("DEAT", "Death", Person),
    Burial => ("BURI", "Burial", Person),
    Cremation => ("CREM", "Cremation", Person),
    Adoption => ("ADOP", "Adoption", Person),
    BarMitzvah => ("BARM", "Bar Mitzvah", Person),
    BatMitzvah => ("BASM", "Bat Mitzvah", Person),
    Blessing => ("BLES", "Blessing", Person),
    AdultChristening => ("CHRA", "Adult Christening", Person),
    Confirmation => ("CONF", "Confirmation", Person),
    FirstCommunion => ("FCOM", "First Communion", Person),
    Ordination => ("ORDN", "Ordination", Person),
    Naturalization => ("NATU", "Naturalization", Person),
    Emigration => ("EMIG", "Emigration", Person),
    Immigration => ("IMMI", "Immigration", Person),
    Census => ("CENS", "Census", Both),
    Probate => ("PROB", "Probate", Person),
    Will => ("WILL", "Will", Person),
    Graduation => ("GRAD", "Graduation", Person),
    Retirement => ("RETI", "Retirement", Person),
    Residence => ("RESI", "Residence", Both),
    Occupation => ("OCCU", "Occupation", Person),
    Education => ("EDUC", "Education", Person),
    Religion => ("RELI", "Religion", Person),
    Nationality => ("NATI", "Nationality", Person),
    Title => ("TITL", "Title (nobility)", Person),
    Caste => ("CAST", "Caste", Person),
    PhysicalDescription => ("DSCR", "Physical Description", Person),
    SocialSecurityNumber => ("SSN", "Social Security Number", Person),
    Property => ("PROP", "Property", Person),
    MilitaryService => ("_MILT", "Military", Person),
    LdsBaptism => ("BAPL", "LDS Baptism", Person),
    LdsConfirmation => ("CONL", "LDS Confirmation", Person),
    LdsEndowment => ("ENDL", "LDS Endowment", Person),
    LdsChildSealing => ("SLGC", "LDS Child Sealing", Person),
    LdsSpouseSealing => ("SLGS", "LDS Spouse Sealing", Family),
    Marriage => ("MARR", "Marriage", Family),
    MarriageBanns => ("MARB", "Marriage Banns", Family),
    MarriageContract => ("MARC", "Marriage Contract", Family),
    MarriageLicense => ("MARL", "Marriage License", Family),
    MarriageSettlement => ("MARS", "Marriage Settlement", Family),
    Engagement => ("ENGA", "Engagement", Family),
    Divorce => ("DIV", "Divorce", Family),
    DivorceFiling => ("DIVF", "Divorce Filing", Family),
    Annulment => ("ANUL", "Annulment", Family),
    Separation => ("_SEPR", "Separation", Family),
    Other => ("EVEN", "Other", Both),
}

impl EventKind {
    /// Look up the kind for a tag in the given owner context.
    pub fn from_tag(tag: &str, family: bool) -> Option<EventKind> {
        EventKind::ALL.iter().copied().find(|k| {
            k.tag() == tag
                && match k.scope() {
                    EventScope::Both => true,
                    EventScope::Person => !family,
                    EventScope::Family => family,
                }
        })
    }

    /// Rank of the marquee kinds; every other kind is unranked.
    pub fn rank(self) -> Option<u8> {
        match self {
            EventKind::Birth => Some(0),
            EventKind::Marriage => Some(1),
            EventKind::Christening => Some(2),
            EventKind::Death => Some(3),
            EventKind::Burial => Some(4),
            _ => None,
        }
    }

    pub fn is_lds_ordinance(self) -> bool {
        matches!(
            self,
            EventKind::LdsBaptism
                | EventKind::LdsConfirmation
                | EventKind::LdsEndowment
                | EventKind::LdsChildSealing
                | EventKind::LdsSpouseSealing
        )
    }

    /// Death-evidence kinds used by living-status inference.
    pub fn implies_death(self) -> bool {
        matches!(
            self,
            EventKind::Death | EventKind::Burial | EventKind::Cremation | EventKind::Probate
        )
    }

    /// Birth-evidence kinds, strongest first.
    pub const BIRTH_LIKE: &'static [EventKind] = &[
        EventKind::Birth,
        EventKind::Christening,
        EventKind::Baptism,
    ];
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// Recognized attribute names, in comparator order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAttribute {
    Date,
    Place,
    Age,
    Cause,
    Temple,
    Status,
    Agency,
}

impl EventAttribute {
    pub const ALL: &'static [EventAttribute] = &[
        EventAttribute::Date,
        EventAttribute::Place,
        EventAttribute::Age,
        EventAttribute::Cause,
        EventAttribute::Temple,
        EventAttribute::Status,
        EventAttribute::Agency,
    ];

    pub fn from_tag(tag: &str) -> Option<EventAttribute> {
        Some(match tag {
            "DATE" => EventAttribute::Date,
            "PLAC" => EventAttribute::Place,
            "AGE" => EventAttribute::Age,
            "CAUS" => EventAttribute::Cause,
            "TEMP" => EventAttribute::Temple,
            "STAT" => EventAttribute::Status,
            "AGNC" => EventAttribute::Agency,
            _ => return None,
        })
    }
}

// ============================================================================
// Event
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    kind: EventKind,
    description: Option<String>,
    content: Option<String>,
    attributes: BTreeMap<EventAttribute, String>,
    date: Option<FuzzyDate>,
    refs: References,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            description: None,
            content: None,
            attributes: BTreeMap::new(),
            date: None,
            refs: References::default(),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.description = Some(text.to_string());
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Appends to the free-text content, one paragraph per call.
    pub fn append_content(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        match &mut self.content {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(text);
            }
            None => self.content = Some(text.to_string()),
        }
    }

    pub fn attribute(&self, attr: EventAttribute) -> Option<&str> {
        self.attributes.get(&attr).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<EventAttribute, String> {
        &self.attributes
    }

    /// Sets an attribute; the first non-empty value wins.
    pub fn set_attribute(&mut self, attr: EventAttribute, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() || self.attributes.contains_key(&attr) {
            return false;
        }
        self.attributes.insert(attr, value.to_string());
        true
    }

    /// Sets the date text together with its interpretation.
    pub fn set_date(&mut self, date: FuzzyDate) -> bool {
        if !self.set_attribute(EventAttribute::Date, date.original()) {
            return false;
        }
        self.date = Some(date);
        true
    }

    pub fn date(&self) -> Option<&FuzzyDate> {
        self.date.as_ref()
    }

    pub fn date_text(&self) -> Option<&str> {
        self.attribute(EventAttribute::Date)
    }

    pub fn place(&self) -> Option<&str> {
        self.attribute(EventAttribute::Place)
    }

    fn sort_key(&self) -> Option<i64> {
        self.date.as_ref().and_then(FuzzyDate::sort_key)
    }
}

impl ReferenceContainer for Event {
    fn references(&self) -> &References {
        &self.refs
    }

    fn references_mut(&mut self) -> &mut References {
        &mut self.refs
    }
}

fn compare_rank(a: Option<u8>, b: Option<u8>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_sort_key(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_rank(self.kind.rank(), other.kind.rank())
            .then_with(|| compare_sort_key(self.sort_key(), other.sort_key()))
            .then_with(|| {
                EventAttribute::ALL
                    .iter()
                    .map(|a| self.attribute(*a).cmp(&other.attribute(*a)))
                    .find(|o| o.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| self.kind.display_name().cmp(other.kind.display_name()))
            .then_with(|| self.description.cmp(&other.description))
            .then_with(|| self.content.cmp(&other.content))
            .then_with(|| self.citation_count().cmp(&other.citation_count()))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::{DateInterpreter, GedcomDateInterpreter};

    fn dated(kind: EventKind, date: &str) -> Event {
        let mut e = Event::new(kind);
        e.set_date(GedcomDateInterpreter::new().interpret(date));
        e
    }

    #[test]
    fn marquee_rank_beats_dates() {
        let burial = dated(EventKind::Burial, "1800");
        let birth = dated(EventKind::Birth, "1900");
        let residence = dated(EventKind::Residence, "1700");
        let mut v = vec![residence.clone(), burial.clone(), birth.clone()];
        v.sort();
        assert_eq!(v, vec![birth, burial, residence]);
    }

    #[test]
    fn marriage_ranks_before_christening() {
        assert!(Event::new(EventKind::Marriage) < Event::new(EventKind::Christening));
    }

    #[test]
    fn unranked_kinds_order_by_date_then_name() {
        let a = dated(EventKind::Residence, "1850");
        let b = dated(EventKind::Census, "1860");
        assert!(a < b);

        let c = Event::new(EventKind::Census);
        let r = Event::new(EventKind::Residence);
        assert!(c < r, "kind name breaks the tie");
        assert!(b < c, "undated events sort after dated ones");
    }

    #[test]
    fn citation_count_is_the_last_tie_break() {
        let a = Event::new(EventKind::Occupation);
        let mut b = a.clone();
        assert_eq!(a, b);
        b.add_citation(crate::references::Citation::to_source("S1"));
        assert!(a < b);
    }

    #[test]
    fn first_attribute_value_wins() {
        let mut e = Event::new(EventKind::Birth);
        assert!(e.set_attribute(EventAttribute::Place, "Boston"));
        assert!(!e.set_attribute(EventAttribute::Place, "Salem"));
        assert!(!e.set_attribute(EventAttribute::Cause, "  "));
        assert_eq!(e.place(), Some("Boston"));
    }

    #[test]
    fn tags_resolve_by_scope() {
        assert_eq!(EventKind::from_tag("MARR", true), Some(EventKind::Marriage));
        assert_eq!(EventKind::from_tag("MARR", false), None);
        assert_eq!(EventKind::from_tag("CENS", true), Some(EventKind::Census));
        assert_eq!(EventKind::from_tag("CENS", false), Some(EventKind::Census));
        assert_eq!(EventKind::from_tag("SLGC", false), Some(EventKind::LdsChildSealing));
    }
}
