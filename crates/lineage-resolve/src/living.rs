//! Living-status inference.
//!
//! 1. Per person: a death-like event means dead; otherwise the latest
//!    possible birth year decides; otherwise privacy placeholders in the
//!    person's or a close relative's data mean living.
//! 2. Fixed point: each newly living person makes every still-unknown
//!    spouse and child of their parent families living. Spouse families
//!    join only under `living_spreads_through_spouse_families`.
//! 3. Anyone still unknown is dead.
//!
//! Status only ever leaves `Unknown`, so every person enters the worklist at
//! most once and pass 2 pops at most `|people|` entries.

use std::collections::VecDeque;

use lineage_model::{EventContainer, LivingStatus, Person, RecordGraph};

use crate::config::ResolveConfig;
use crate::quality::latest_birth_year;

/// Date or name text that marks withheld data about a living person.
const PLACEHOLDERS: &[&str] = &["LIVING", "PRIVATE", "<PRIVATE>", "WITHHELD", "<WITHHELD>"];

fn is_placeholder(text: &str) -> bool {
    let t = text.trim();
    PLACEHOLDERS.iter().any(|p| t.eq_ignore_ascii_case(p))
}

fn has_withheld_dates<C: EventContainer>(owner: &C) -> bool {
    owner
        .events()
        .iter()
        .filter_map(|e| e.date_text())
        .any(is_placeholder)
}

/// Textual privacy markers on the person or anyone one step away.
fn has_living_marker(graph: &RecordGraph, person: &Person) -> bool {
    if person.names().any(|n| n.is_living_placeholder()) || has_withheld_dates(person) {
        return true;
    }
    let families = person
        .child_of_families()
        .iter()
        .chain(person.spouse_of_families())
        .filter_map(|f| graph.family(f));
    for family in families {
        if has_withheld_dates(family) {
            return true;
        }
        let relatives = family
            .spouse_keys()
            .chain(family.child_keys())
            .filter(|k| *k != person.key())
            .filter_map(|k| graph.person(k));
        for relative in relatives {
            if has_withheld_dates(relative) {
                return true;
            }
        }
    }
    false
}

/// Pass 1 verdict for one person; `Unknown` when nothing decides.
pub fn classify(graph: &RecordGraph, person: &Person, config: &ResolveConfig) -> LivingStatus {
    if person.events().iter().any(|e| e.kind().implies_death()) {
        return LivingStatus::Dead;
    }
    if let Some(year) = latest_birth_year(graph, person, config) {
        return if year < config.current_year - config.max_lifespan_years {
            LivingStatus::Dead
        } else {
            LivingStatus::Living
        };
    }
    if has_living_marker(graph, person) {
        return LivingStatus::Living;
    }
    LivingStatus::Unknown
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LivingSummary {
    pub living: usize,
    pub dead: usize,
    pub iterations: usize,
}

fn close_family(graph: &RecordGraph, key: &str, config: &ResolveConfig) -> Vec<String> {
    let Some(person) = graph.person(key) else {
        return Vec::new();
    };
    let own = person
        .spouse_of_families()
        .iter()
        .filter(|_| config.living_spreads_through_spouse_families);
    person
        .child_of_families()
        .iter()
        .chain(own)
        .filter_map(|f| graph.family(f))
        .flat_map(|f| f.spouse_keys().chain(f.child_keys()))
        .filter(|k| *k != key)
        .map(str::to_string)
        .collect()
}

pub fn infer_living(graph: &mut RecordGraph, config: &ResolveConfig) -> LivingSummary {
    let mut summary = LivingSummary::default();

    // Pass 1 reads the whole graph, so verdicts are gathered before writing.
    let verdicts: Vec<(String, LivingStatus)> = graph
        .people
        .values()
        .map(|p| (p.key().to_string(), classify(graph, p, config)))
        .collect();
    let mut worklist = VecDeque::new();
    for (key, status) in verdicts {
        if let Some(person) = graph.person_mut(&key) {
            if person.set_living_status(status) && status == LivingStatus::Living {
                worklist.push_back(key);
            }
        }
    }

    // Pass 2.
    while let Some(key) = worklist.pop_front() {
        summary.iterations += 1;
        for relative in close_family(graph, &key, config) {
            let Some(person) = graph.person_mut(&relative) else {
                continue;
            };
            if person.set_living_status(LivingStatus::Living) {
                tracing::debug!(person = %relative, via = %key, "living by relation");
                worklist.push_back(relative);
            }
        }
    }

    // Pass 3.
    for person in graph.people.values_mut() {
        person.set_living_status(LivingStatus::Dead);
        match person.living_status() {
            LivingStatus::Living => summary.living += 1,
            LivingStatus::Dead => summary.dead += 1,
            LivingStatus::Unknown => {}
        }
    }

    tracing::info!(
        living = summary.living,
        dead = summary.dead,
        iterations = summary.iterations,
        "living status inferred"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_model::{Child, DateInterpreter, Event, EventKind, Family, GedcomDateInterpreter, Name};

    fn config() -> ResolveConfig {
        ResolveConfig {
            current_year: 2026,
            ..ResolveConfig::default()
        }
    }

    fn born(key: &str, year: i32) -> Person {
        let mut p = Person::new(key);
        let mut e = Event::new(EventKind::Birth);
        e.set_date(GedcomDateInterpreter::new().interpret(&year.to_string()));
        p.add_event(e);
        p
    }

    #[test]
    fn death_beats_a_recent_birth() {
        let mut g = RecordGraph::new();
        let mut p = born("I1", 2000);
        p.add_event(Event::new(EventKind::Burial));
        g.insert_person(p);
        let person = g.person("I1").expect("person");
        assert_eq!(classify(&g, person, &config()), LivingStatus::Dead);
    }

    #[test]
    fn placeholder_name_means_living() {
        let mut g = RecordGraph::new();
        let mut p = Person::new("I1");
        p.add_name(Name::parse("Living /Smith/"));
        g.insert_person(p);
        let person = g.person("I1").expect("person");
        assert_eq!(classify(&g, person, &config()), LivingStatus::Living);
    }

    #[test]
    fn living_spreads_to_undated_relatives_only() {
        let mut g = RecordGraph::new();
        let mut f = Family::new("F1");
        f.add_husband("I1", false);
        f.add_wife("I2", false);
        f.add_child(Child::new("I3"));
        f.add_child(Child::new("I4"));
        g.insert_family(f);

        let mut husband = Person::new("I1");
        husband.add_spouse_of("F1");
        g.insert_person(husband);
        let mut wife = Person::new("I2");
        wife.add_spouse_of("F1");
        wife.add_event(Event::new(EventKind::Death));
        g.insert_person(wife);
        let mut young = born("I3", 1990);
        young.add_child_of("F1");
        g.insert_person(young);
        let mut undated = Person::new("I4");
        undated.add_child_of("F1");
        g.insert_person(undated);
        g.insert_person(Person::new("I9"));

        let summary = infer_living(&mut g, &config());
        let status = |k: &str| g.person(k).map(Person::living_status);
        assert_eq!(status("I3"), Some(LivingStatus::Living));
        assert_eq!(status("I1"), Some(LivingStatus::Living));
        assert_eq!(status("I4"), Some(LivingStatus::Living));
        assert_eq!(status("I2"), Some(LivingStatus::Dead));
        assert_eq!(status("I9"), Some(LivingStatus::Dead));
        assert_eq!(summary.living, 3);
        assert_eq!(summary.dead, 2);
        assert!(summary.iterations <= 5);
    }

    #[test]
    fn spouse_families_spread_only_when_enabled() {
        let build = || {
            let mut g = RecordGraph::new();
            let mut f = Family::new("F1");
            f.add_husband("I1", false);
            f.add_wife("I2", false);
            f.add_child(Child::new("I3"));
            g.insert_family(f);
            let mut husband = Person::new("I1");
            husband.add_name(Name::parse("Living /Hart/"));
            husband.add_spouse_of("F1");
            g.insert_person(husband);
            let mut wife = Person::new("I2");
            wife.add_spouse_of("F1");
            g.insert_person(wife);
            let mut child = Person::new("I3");
            child.add_child_of("F1");
            g.insert_person(child);
            g
        };

        let mut g = build();
        infer_living(&mut g, &config());
        assert_eq!(g.person("I2").map(Person::living_status), Some(LivingStatus::Dead));
        assert_eq!(g.person("I3").map(Person::living_status), Some(LivingStatus::Dead));

        let mut g = build();
        let widened = ResolveConfig {
            living_spreads_through_spouse_families: true,
            ..config()
        };
        infer_living(&mut g, &widened);
        assert_eq!(g.person("I2").map(Person::living_status), Some(LivingStatus::Living));
        assert_eq!(g.person("I3").map(Person::living_status), Some(LivingStatus::Living));
    }
}
