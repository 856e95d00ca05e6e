//! The "event container" capability (Person, Family, Source).

use std::collections::BTreeSet;

use crate::event::{Event, EventKind};
use crate::references::{Citation, NoteLink, ReferenceContainer, References};

/// Sequential numbering of every citation and note reachable from one
/// container, as the renderer labels them (`S1`, `S2`, ... / `N1`, ...).
///
/// Equal citations (and notes with the same identity) share one number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceNumbers {
    pub citations: Vec<(String, Citation)>,
    pub notes: Vec<(String, NoteLink)>,
}

impl ReferenceNumbers {
    fn collect(&mut self, refs: &References) {
        for citation in &refs.citations {
            if !self.citations.iter().any(|(_, c)| c == citation) {
                let id = format!("S{}", self.citations.len() + 1);
                self.citations.push((id, citation.clone()));
            }
        }
        for note in &refs.notes {
            if !self.notes.iter().any(|(_, n)| n == note) {
                let id = format!("N{}", self.notes.len() + 1);
                self.notes.push((id, note.clone()));
            }
        }
    }

    pub fn citation_id(&self, citation: &Citation) -> Option<&str> {
        self.citations
            .iter()
            .find(|(_, c)| c == citation)
            .map(|(id, _)| id.as_str())
    }

    pub fn note_id(&self, note: &NoteLink) -> Option<&str> {
        self.notes
            .iter()
            .find(|(_, n)| n == note)
            .map(|(id, _)| id.as_str())
    }
}

pub trait EventContainer: ReferenceContainer {
    fn events(&self) -> &BTreeSet<Event>;
    fn events_mut(&mut self) -> &mut BTreeSet<Event>;

    /// Reference holders other than `self` and its events (e.g. names).
    fn nested_references(&self) -> Vec<&References> {
        Vec::new()
    }

    /// Inserts an event. An equal event already present absorbs the new
    /// event's notes, citations and images instead of being duplicated.
    fn add_event(&mut self, event: Event) {
        let events = self.events_mut();
        match events.take(&event) {
            Some(mut existing) => {
                let mut incoming = event;
                let refs = std::mem::take(incoming.references_mut());
                existing.references_mut().merge(refs);
                events.insert(existing);
            }
            None => {
                events.insert(event);
            }
        }
    }

    fn events_of(&self, kind: EventKind) -> Vec<&Event> {
        self.events().iter().filter(|e| e.kind() == kind).collect()
    }

    fn first_event(&self, kind: EventKind) -> Option<&Event> {
        self.events().iter().find(|e| e.kind() == kind)
    }

    fn has_event(&self, kinds: &[EventKind]) -> bool {
        self.events().iter().any(|e| kinds.contains(&e.kind()))
    }

    fn reference_numbers(&self) -> ReferenceNumbers {
        let mut numbers = ReferenceNumbers::default();
        numbers.collect(self.references());
        for refs in self.nested_references() {
            numbers.collect(refs);
        }
        for event in self.events() {
            numbers.collect(event.references());
        }
        numbers
    }
}
