//! Birth-year bounds from a person's own events and their close family.
//!
//! Only the latest bound feeds living-status inference. The earliest bound
//! exists so impossible combinations (a bound pair that crosses) can be
//! counted as data-quality problems.

use lineage_model::date::year_of_day;
use lineage_model::{EventContainer, EventKind, Family, FuzzyDate, Gender, Person, RecordGraph};

use crate::config::ResolveConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BirthBounds {
    pub earliest: Option<i32>,
    pub latest: Option<i32>,
}

impl BirthBounds {
    fn tighten_latest(&mut self, year: Option<i32>) {
        if let Some(y) = year {
            self.latest = Some(self.latest.map_or(y, |l| l.min(y)));
        }
    }

    fn tighten_earliest(&mut self, year: Option<i32>) {
        if let Some(y) = year {
            self.earliest = Some(self.earliest.map_or(y, |e| e.max(y)));
        }
    }

    pub fn is_consistent(&self) -> bool {
        match (self.earliest, self.latest) {
            (Some(e), Some(l)) => e <= l,
            _ => true,
        }
    }
}

fn dates<'a>(owner: &'a impl EventContainer, kinds: &'a [EventKind]) -> impl Iterator<Item = &'a FuzzyDate> {
    owner
        .events()
        .iter()
        .filter(move |e| kinds.contains(&e.kind()))
        .filter_map(|e| e.date())
        .filter(|d| d.is_valid())
}

fn latest_year<'a>(dates: impl Iterator<Item = &'a FuzzyDate>) -> Option<i32> {
    dates.filter_map(FuzzyDate::max_year).min()
}

fn earliest_year<'a>(dates: impl Iterator<Item = &'a FuzzyDate>) -> Option<i32> {
    dates.filter_map(FuzzyDate::min_year).max()
}

const DEATH_LIKE: &[EventKind] = &[EventKind::Death, EventKind::Burial, EventKind::Cremation];
const MARRIAGE_LIKE: &[EventKind] = &[EventKind::Marriage, EventKind::MarriageBanns, EventKind::Engagement];

fn spouse_families<'g>(graph: &'g RecordGraph, person: &'g Person) -> impl Iterator<Item = &'g Family> {
    person
        .spouse_of_families()
        .iter()
        .filter_map(|f| graph.family(f))
}

fn parent_families<'g>(graph: &'g RecordGraph, person: &'g Person) -> impl Iterator<Item = &'g Family> {
    person
        .child_of_families()
        .iter()
        .filter_map(|f| graph.family(f))
}

/// Computes birth bounds for one person.
pub fn birth_bounds(graph: &RecordGraph, person: &Person, config: &ResolveConfig) -> BirthBounds {
    let mut bounds = BirthBounds::default();

    // Own birth-like events, then any dated event at all.
    bounds.tighten_latest(latest_year(dates(person, EventKind::BIRTH_LIKE)));
    bounds.tighten_latest(
        person
            .events()
            .iter()
            .filter_map(|e| e.date())
            .filter_map(FuzzyDate::max_year)
            .min(),
    );
    bounds.tighten_earliest(earliest_year(dates(person, EventKind::BIRTH_LIKE)));
    bounds.tighten_earliest(
        earliest_year(dates(person, DEATH_LIKE)).map(|y| y - config.max_age),
    );

    for family in spouse_families(graph, person) {
        bounds.tighten_latest(
            latest_year(dates(family, MARRIAGE_LIKE)).map(|y| y - config.min_parent_age),
        );
        for child in family.child_keys().filter_map(|c| graph.person(c)) {
            bounds.tighten_latest(
                latest_year(dates(child, EventKind::BIRTH_LIKE)).map(|y| y - config.min_parent_age),
            );
            let max_parent_age = match person.gender() {
                Gender::Female => config.max_mother_age,
                _ => config.max_father_age,
            };
            bounds.tighten_earliest(
                earliest_year(dates(child, EventKind::BIRTH_LIKE)).map(|y| y - max_parent_age),
            );
        }
    }

    for family in parent_families(graph, person) {
        bounds.tighten_latest(
            latest_year(dates(family, MARRIAGE_LIKE)).map(|y| y + config.max_parent_age()),
        );
        for husband in family.husbands().iter().filter_map(|s| graph.person(&s.key)) {
            bounds.tighten_latest(
                latest_year(dates(husband, EventKind::BIRTH_LIKE)).map(|y| y + config.max_father_age),
            );
            bounds.tighten_earliest(
                earliest_year(dates(husband, EventKind::BIRTH_LIKE)).map(|y| y + config.min_parent_age),
            );
            // Born at most one gestation after the father's death.
            bounds.tighten_latest(
                dates(husband, DEATH_LIKE)
                    .filter_map(FuzzyDate::max_day)
                    .min()
                    .map(|day| year_of_day(day + config.gestation_days)),
            );
        }
        for wife in family.wives().iter().filter_map(|s| graph.person(&s.key)) {
            bounds.tighten_latest(
                latest_year(dates(wife, EventKind::BIRTH_LIKE)).map(|y| y + config.max_mother_age),
            );
            bounds.tighten_earliest(
                earliest_year(dates(wife, EventKind::BIRTH_LIKE)).map(|y| y + config.min_parent_age),
            );
            bounds.tighten_latest(latest_year(dates(wife, DEATH_LIKE)));
        }
    }

    bounds
}

/// Latest possible birth year, if anything constrains it.
pub fn latest_birth_year(graph: &RecordGraph, person: &Person, config: &ResolveConfig) -> Option<i32> {
    birth_bounds(graph, person, config).latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_model::{Child, DateInterpreter, Event, GedcomDateInterpreter};

    fn event(kind: EventKind, date: &str) -> Event {
        let mut e = Event::new(kind);
        e.set_date(GedcomDateInterpreter::new().interpret(date));
        e
    }

    fn config() -> ResolveConfig {
        ResolveConfig {
            current_year: 2026,
            ..ResolveConfig::default()
        }
    }

    #[test]
    fn own_birth_wins_over_looser_bounds() {
        let mut g = RecordGraph::new();
        let mut p = Person::new("I1");
        p.add_event(event(EventKind::Birth, "1900"));
        p.add_event(event(EventKind::Residence, "1950"));
        g.insert_person(p);
        let person = g.person("I1").expect("person");
        assert_eq!(latest_birth_year(&g, person, &config()), Some(1900));
    }

    #[test]
    fn children_and_marriage_bound_from_below() {
        let mut g = RecordGraph::new();
        let mut f = Family::new("F1");
        f.add_husband("I1", false);
        f.add_child(Child::new("I2"));
        f.add_event(event(EventKind::Marriage, "1930"));
        g.insert_family(f);
        let mut parent = Person::new("I1");
        parent.add_spouse_of("F1");
        g.insert_person(parent);
        let mut child = Person::new("I2");
        child.add_child_of("F1");
        child.add_event(event(EventKind::Birth, "1925"));
        g.insert_person(child);

        let person = g.person("I1").expect("parent");
        assert_eq!(latest_birth_year(&g, person, &config()), Some(1909));
    }

    #[test]
    fn parents_bound_from_above() {
        let mut g = RecordGraph::new();
        let mut f = Family::new("F1");
        f.add_husband("I1", false);
        f.add_wife("I2", false);
        f.add_child(Child::new("I3"));
        g.insert_family(f);
        let mut father = Person::new("I1");
        father.add_event(event(EventKind::Birth, "1900"));
        father.add_event(event(EventKind::Death, "15 JAN 1950"));
        g.insert_person(father);
        let mut mother = Person::new("I2");
        mother.add_event(event(EventKind::Birth, "1910"));
        g.insert_person(mother);
        let mut child = Person::new("I3");
        child.add_child_of("F1");
        g.insert_person(child);

        let person = g.person("I3").expect("child");
        let bounds = birth_bounds(&g, person, &config());
        assert_eq!(bounds.latest, Some(1950));
        assert_eq!(bounds.earliest, Some(1926));
        assert!(bounds.is_consistent());
    }

    #[test]
    fn undated_person_has_no_bounds() {
        let mut g = RecordGraph::new();
        g.insert_person(Person::new("I1"));
        let person = g.person("I1").expect("person");
        assert_eq!(birth_bounds(&g, person, &config()), BirthBounds::default());
    }
}
