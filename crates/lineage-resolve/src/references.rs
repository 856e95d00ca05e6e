//! Reference Resolver
//!
//! Makes person/family membership symmetric, folds structurally identical
//! sources together and pushes repository data down into the sources that
//! cite it. Runs once per file, after parsing and before inference.

use std::collections::{BTreeMap, HashMap};

use lineage_model::{
    Child, EventContainer, Gender, RecordGraph, ReferenceContainer, References, SpouseRole,
};

use crate::error::ResolutionError;
use crate::report::ResolutionReport;

pub fn resolve_references(graph: &mut RecordGraph, report: &mut ResolutionReport) {
    link_people_into_families(graph, report);
    link_families_into_people(graph, report);
    dedupe_sources(graph, report);
    merge_repositories(graph, report);
}

// ============================================================================
// Person -> family
// ============================================================================

fn is_adopted(pedigree: Option<&str>) -> bool {
    pedigree.is_some_and(|p| p.trim().eq_ignore_ascii_case("adopted"))
}

/// Every family a person claims lists the person back.
pub fn link_people_into_families(graph: &mut RecordGraph, report: &mut ResolutionReport) {
    let keys: Vec<String> = graph.people.keys().cloned().collect();
    for key in keys {
        let Some(person) = graph.person(&key) else {
            continue;
        };
        let gender = person.gender();
        let child_of: Vec<(String, bool)> = person
            .child_of_families()
            .iter()
            .map(|f| (f.clone(), is_adopted(person.pedigree(f))))
            .collect();
        let spouse_of: Vec<String> = person.spouse_of_families().iter().cloned().collect();

        for (family_key, adopted) in child_of {
            let Some(family) = graph.family_mut(&family_key) else {
                drop_family_claim(graph, report, &key, &family_key, "parent family");
                continue;
            };
            if family.has_child(&key) {
                if adopted {
                    if let Some(child) = family.child_mut(&key) {
                        child.adopted = true;
                    }
                }
                continue;
            }
            let mut child = Child::new(key.as_str());
            child.adopted = adopted;
            family.add_child(child);
            report.repaired_links += 1;
            tracing::debug!(person = %key, family = %family_key, "added missing child link");
        }

        for family_key in spouse_of {
            let Some(family) = graph.family_mut(&family_key) else {
                drop_family_claim(graph, report, &key, &family_key, "spouse family");
                continue;
            };
            if family.has_spouse(&key) {
                continue;
            }
            let role = match gender {
                Gender::Male => Some(SpouseRole::Husband),
                Gender::Female => Some(SpouseRole::Wife),
                Gender::Unknown => family.open_spouse_slot(),
            };
            match role {
                Some(role) => {
                    family.add_spouse(role, &key, false);
                    report.repaired_links += 1;
                    tracing::debug!(person = %key, family = %family_key, ?role, "added missing spouse link");
                }
                None => report.error(ResolutionError::AmbiguousGender {
                    person: key.clone(),
                    family: family_key,
                }),
            }
        }
    }
}

fn drop_family_claim(
    graph: &mut RecordGraph,
    report: &mut ResolutionReport,
    person: &str,
    family: &str,
    relation: &'static str,
) {
    if let Some(p) = graph.person_mut(person) {
        if relation == "parent family" {
            p.remove_child_of(family);
        } else {
            p.remove_spouse_of(family);
        }
    }
    report.removed_dangling += 1;
    report.error(ResolutionError::DanglingReference {
        owner: person.to_string(),
        relation,
        target: family.to_string(),
    });
}

// ============================================================================
// Family -> person
// ============================================================================

/// Every spouse and child a family lists claims the family back; members
/// that do not exist are removed from the family.
pub fn link_families_into_people(graph: &mut RecordGraph, report: &mut ResolutionReport) {
    let keys: Vec<String> = graph.families.keys().cloned().collect();
    for family_key in keys {
        let Some(family) = graph.family(&family_key) else {
            continue;
        };
        let spouses: Vec<String> = family.spouse_keys().map(str::to_string).collect();
        let children: Vec<String> = family.child_keys().map(str::to_string).collect();

        for spouse in spouses {
            match graph.person_mut(&spouse) {
                Some(person) => {
                    if person.add_spouse_of(&family_key) {
                        report.repaired_links += 1;
                    }
                }
                None => {
                    if let Some(family) = graph.family_mut(&family_key) {
                        family.remove_spouse(&spouse);
                    }
                    report.removed_dangling += 1;
                    report.error(ResolutionError::DanglingReference {
                        owner: family_key.clone(),
                        relation: "spouse",
                        target: spouse,
                    });
                }
            }
        }

        for child in children {
            match graph.person_mut(&child) {
                Some(person) => {
                    if person.add_child_of(&family_key) {
                        report.repaired_links += 1;
                    }
                }
                None => {
                    if let Some(family) = graph.family_mut(&family_key) {
                        family.remove_child(&child);
                    }
                    report.removed_dangling += 1;
                    report.error(ResolutionError::DanglingReference {
                        owner: family_key.clone(),
                        relation: "child",
                        target: child,
                    });
                }
            }
        }
    }
}

// ============================================================================
// Sources and repositories
// ============================================================================

fn remap_citations(refs: &mut References, remap: &HashMap<String, String>) {
    let citations = std::mem::take(&mut refs.citations);
    for mut citation in citations {
        if let Some(canonical) = citation
            .source_key
            .as_ref()
            .and_then(|k| remap.get(k))
        {
            citation.source_key = Some(canonical.clone());
        }
        refs.absorb_citation(citation);
    }
    for citation in &mut refs.citations {
        remap_citations(&mut citation.refs, remap);
    }
}

/// Rewrites citations on an event container, rebuilding its event set since
/// citation counts take part in event ordering.
fn remap_container<C: EventContainer>(owner: &mut C, remap: &HashMap<String, String>) {
    remap_citations(owner.references_mut(), remap);
    let events = std::mem::take(owner.events_mut());
    for mut event in events {
        remap_citations(event.references_mut(), remap);
        owner.add_event(event);
    }
}

/// Folds sources with identical content into the first one the file
/// declared and points every citation at the survivor.
pub fn dedupe_sources(graph: &mut RecordGraph, report: &mut ResolutionReport) {
    let mut canonical: BTreeMap<String, String> = BTreeMap::new();
    let mut remap: HashMap<String, String> = HashMap::new();
    for key in graph.source_keys_in_arrival_order() {
        let Some(source) = graph.sources.get(&key) else {
            continue;
        };
        match canonical.get(&source.fingerprint()) {
            Some(first) => {
                remap.insert(key, first.clone());
            }
            None => {
                canonical.insert(source.fingerprint(), key);
            }
        }
    }
    if remap.is_empty() {
        return;
    }

    for (duplicate, survivor) in &remap {
        if let Some(source) = graph.sources.remove(duplicate) {
            if let Some(target) = graph.sources.get_mut(survivor) {
                target.refs.merge(source.refs);
                for event in source.events {
                    target.add_event(event);
                }
            }
        }
        tracing::info!(duplicate = %duplicate, canonical = %survivor, "folded duplicate source");
    }
    report.folded_sources += remap.len();

    for person in graph.people.values_mut() {
        remap_container(person, &remap);
        for name in person.names_mut() {
            remap_citations(&mut name.refs, &remap);
        }
    }
    for family in graph.families.values_mut() {
        remap_container(family, &remap);
    }
    for source in graph.sources.values_mut() {
        remap_container(source, &remap);
    }
    for note in graph.notes.values_mut() {
        remap_citations(&mut note.refs, &remap);
    }
    for image in graph.images.values_mut() {
        remap_citations(&mut image.refs, &remap);
    }
}

/// Copies repository name and address onto each citing source, then drops
/// the repository records.
pub fn merge_repositories(graph: &mut RecordGraph, report: &mut ResolutionReport) {
    let repositories = std::mem::take(&mut graph.repositories);
    for source in graph.sources.values_mut() {
        let links = std::mem::take(&mut source.repositories);
        let mut kept = Vec::with_capacity(links.len());
        for mut link in links {
            if let Some(key) = link.key.clone() {
                match repositories.get(&key) {
                    Some(repo) => {
                        if link.name.is_none() {
                            link.name = repo.name.clone();
                        }
                        if source.repository_address.is_none() {
                            source.repository_address = repo.address.clone();
                        }
                        report.merged_repositories += 1;
                    }
                    None => {
                        report.removed_dangling += 1;
                        report.error(ResolutionError::DanglingReference {
                            owner: source.key.clone(),
                            relation: "repository",
                            target: key,
                        });
                        link.key = None;
                        if link.name.is_none() && link.call_number.is_none() {
                            continue;
                        }
                    }
                }
            }
            if source.repository_name.is_none() {
                source.repository_name = link.name.clone();
            }
            if source.call_number.is_none() {
                source.call_number = link.call_number.clone();
            }
            kept.push(link);
        }
        source.repositories = kept;
    }
    if !repositories.is_empty() {
        tracing::debug!(count = repositories.len(), "repository records discarded after merge");
    }
}
