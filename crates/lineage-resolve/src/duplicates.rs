//! Duplicate family detection.
//!
//! Two families with the same husband and wife keys are likely the same
//! couple entered twice. They are reported, never merged; a pair whose
//! marriage dates cannot overlap is treated as two real marriages.

use std::collections::BTreeMap;

use lineage_model::{EventContainer, EventKind, Family, RecordGraph};

fn couple(family: &Family) -> Option<(Vec<&str>, Vec<&str>)> {
    let mut husbands: Vec<&str> = family.husbands().iter().map(|s| s.key.as_str()).collect();
    let mut wives: Vec<&str> = family.wives().iter().map(|s| s.key.as_str()).collect();
    if husbands.is_empty() || wives.is_empty() {
        return None;
    }
    husbands.sort_unstable();
    wives.sort_unstable();
    Some((husbands, wives))
}

fn marriage_range(family: &Family) -> Option<(i32, i32)> {
    let date = family.first_event(EventKind::Marriage)?.date()?;
    Some((date.min_day()?, date.max_day()?))
}

fn marriages_conflict(a: &Family, b: &Family) -> bool {
    match (marriage_range(a), marriage_range(b)) {
        (Some((a_min, a_max)), Some((b_min, b_max))) => a_max < b_min || b_max < a_min,
        _ => false,
    }
}

/// Pairs of family keys that look like the same couple, lower key first.
pub fn detect_duplicate_families(graph: &RecordGraph) -> Vec<(String, String)> {
    let mut by_couple: BTreeMap<(Vec<&str>, Vec<&str>), Vec<&Family>> = BTreeMap::new();
    for family in graph.families.values() {
        if let Some(key) = couple(family) {
            by_couple.entry(key).or_default().push(family);
        }
    }

    let mut pairs = Vec::new();
    for families in by_couple.values() {
        for (i, a) in families.iter().enumerate() {
            for b in &families[i + 1..] {
                if !marriages_conflict(a, b) {
                    tracing::warn!(first = %a.key(), second = %b.key(), "possible duplicate family");
                    pairs.push((a.key().to_string(), b.key().to_string()));
                }
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_model::{DateInterpreter, Event, GedcomDateInterpreter};

    fn family(key: &str, married: Option<&str>) -> Family {
        let mut f = Family::new(key);
        f.add_husband("I1", false);
        f.add_wife("I2", false);
        if let Some(date) = married {
            let mut e = Event::new(EventKind::Marriage);
            e.set_date(GedcomDateInterpreter::new().interpret(date));
            f.add_event(e);
        }
        f
    }

    #[test]
    fn same_couple_is_flagged() {
        let mut g = RecordGraph::new();
        g.insert_family(family("F1", Some("1850")));
        g.insert_family(family("F2", None));
        assert_eq!(
            detect_duplicate_families(&g),
            vec![("F1".to_string(), "F2".to_string())]
        );
    }

    #[test]
    fn disjoint_marriage_dates_are_separate_marriages() {
        let mut g = RecordGraph::new();
        g.insert_family(family("F1", Some("1850")));
        g.insert_family(family("F2", Some("1870")));
        assert!(detect_duplicate_families(&g).is_empty());
    }
}
