//! Born-before-cutoff propagation.
//!
//! Seeds are people with any event whose latest possible day falls before
//! the cutoff day. Every marked person marks the spouses of their parent
//! families, recursively. Seeds and their marked ancestors also mark the
//! spouses and children of their own families. Anyone with a birth-like
//! event that starts after the cutoff is never marked.

use std::collections::VecDeque;

use lineage_model::{EventContainer, EventKind, Person, RecordGraph};

use crate::config::ResolveConfig;

fn has_event_before(person: &Person, cutoff_day: i32) -> bool {
    person
        .events()
        .iter()
        .filter_map(|e| e.date())
        .filter_map(|d| d.max_day())
        .any(|day| day < cutoff_day)
}

fn born_after(person: &Person, cutoff_day: i32) -> bool {
    person
        .events()
        .iter()
        .filter(|e| EventKind::BIRTH_LIKE.contains(&e.kind()))
        .filter_map(|e| e.date())
        .filter_map(|d| d.min_day())
        .any(|day| day > cutoff_day)
}

/// Marks `key` if allowed; returns whether it was newly marked.
fn mark(graph: &mut RecordGraph, key: &str, cutoff_day: i32) -> bool {
    match graph.person_mut(key) {
        Some(person) if !born_after(person, cutoff_day) => person.mark_born_before_cutoff(),
        _ => false,
    }
}

/// Runs propagation and returns the number of people marked.
pub fn propagate_cutoff(graph: &mut RecordGraph, config: &ResolveConfig) -> usize {
    let cutoff_day = config.cutoff_day();

    // (person, may descend into own families)
    let mut queue: VecDeque<(String, bool)> = VecDeque::new();
    let seeds: Vec<String> = graph
        .people
        .values()
        .filter(|p| has_event_before(p, cutoff_day))
        .map(|p| p.key().to_string())
        .collect();
    for key in seeds {
        if let Some(person) = graph.person_mut(&key) {
            person.mark_born_before_cutoff();
        }
        queue.push_back((key, true));
    }

    while let Some((key, descend)) = queue.pop_front() {
        let Some(person) = graph.person(&key) else {
            continue;
        };
        let parents: Vec<String> = graph.parents_of(&key).into_iter().map(str::to_string).collect();
        let own_family: Vec<String> = if descend {
            person
                .spouse_of_families()
                .iter()
                .filter_map(|f| graph.family(f))
                .flat_map(|f| f.spouse_keys().chain(f.child_keys()))
                .filter(|k| *k != key)
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };

        for parent in parents {
            if mark(graph, &parent, cutoff_day) {
                queue.push_back((parent, true));
            }
        }
        for relative in own_family {
            if mark(graph, &relative, cutoff_day) {
                queue.push_back((relative, false));
            }
        }
    }

    let marked = graph
        .people
        .values()
        .filter(|p| p.is_born_before_cutoff())
        .count();
    tracing::info!(marked, cutoff_year = config.effective_cutoff_year(), "cutoff propagated");
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_model::{Child, DateInterpreter, Event, Family, GedcomDateInterpreter};

    fn with_event(key: &str, kind: EventKind, date: &str) -> Person {
        let mut p = Person::new(key);
        let mut e = Event::new(kind);
        e.set_date(GedcomDateInterpreter::new().interpret(date));
        p.add_event(e);
        p
    }

    /// I1 + I2 parents of I3; I3 married to I4 with child I5.
    fn three_generations(i3_birth: &str, i5: Person) -> RecordGraph {
        let mut g = RecordGraph::new();
        let mut f1 = Family::new("F1");
        f1.add_husband("I1", false);
        f1.add_wife("I2", false);
        f1.add_child(Child::new("I3"));
        g.insert_family(f1);
        let mut f2 = Family::new("F2");
        f2.add_husband("I3", false);
        f2.add_wife("I4", false);
        f2.add_child(Child::new("I5"));
        g.insert_family(f2);

        let mut i1 = Person::new("I1");
        i1.add_spouse_of("F1");
        g.insert_person(i1);
        let mut i2 = with_event("I2", EventKind::Birth, "1800");
        i2.add_spouse_of("F1");
        g.insert_person(i2);
        let mut i3 = with_event("I3", EventKind::Birth, i3_birth);
        i3.add_child_of("F1");
        i3.add_spouse_of("F2");
        g.insert_person(i3);
        let mut i4 = Person::new("I4");
        i4.add_spouse_of("F2");
        g.insert_person(i4);
        let mut i5 = i5;
        i5.add_child_of("F2");
        g.insert_person(i5);
        g
    }

    #[test]
    fn marks_ancestors_and_immediate_family() {
        let mut g = three_generations("1700", Person::new("I5"));
        let marked = propagate_cutoff(&mut g, &ResolveConfig::default());
        for key in ["I1", "I3", "I4", "I5"] {
            assert!(g.person(key).is_some_and(Person::is_born_before_cutoff), "{key}");
        }
        assert!(!g.person("I2").is_some_and(Person::is_born_before_cutoff));
        assert_eq!(marked, 4);
    }

    #[test]
    fn later_births_stop_propagation() {
        let child = with_event("I5", EventKind::Birth, "1900");
        let mut g = three_generations("1700", child);
        propagate_cutoff(&mut g, &ResolveConfig::default());
        assert!(!g.person("I5").is_some_and(Person::is_born_before_cutoff));
    }

    #[test]
    fn trusted_cutoff_reaches_later_people() {
        let mut g = three_generations("1820", Person::new("I5"));
        assert_eq!(propagate_cutoff(&mut g, &ResolveConfig::default()), 0);

        let mut g = three_generations("1820", Person::new("I5"));
        let trusted = ResolveConfig {
            trusted_uploader: true,
            ..ResolveConfig::default()
        };
        assert!(propagate_cutoff(&mut g, &trusted) >= 3);
        assert!(g.person("I2").is_some_and(Person::is_born_before_cutoff));
    }
}
