//! Ordering of people for display and duplicate detection.

use std::cmp::Ordering;

use crate::container::EventContainer;
use crate::event::EventKind;
use crate::person::Person;

/// Sort key of the strongest dated birth-like event (birth, christening,
/// baptism), if any.
pub fn birth_sort_key(person: &Person) -> Option<i64> {
    EventKind::BIRTH_LIKE.iter().find_map(|kind| {
        person
            .events_of(*kind)
            .into_iter()
            .find_map(|e| e.date().and_then(|d| d.sort_key()))
    })
}

/// Orders people by birth-like date (undated last), then surname, given
/// name, and finally key so the order is total.
pub fn compare_people(a: &Person, b: &Person) -> Ordering {
    let by_date = match (birth_sort_key(a), birth_sort_key(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    let name_parts = |p: &Person| {
        p.name()
            .map(|n| (n.surname.clone(), n.given.clone()))
            .unwrap_or((None, None))
    };
    by_date
        .then_with(|| name_parts(a).cmp(&name_parts(b)))
        .then_with(|| a.key().cmp(b.key()))
}
