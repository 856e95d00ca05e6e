//! Tag aliases folded to one canonical spelling before rule lookup.

use std::collections::{BTreeMap, HashMap};

/// Vendor and dialect spellings mapped onto the standard tag.
const STANDARD_SYNONYMS: &[(&str, &str)] = &[
    ("BAPT", "BAPM"),
    ("CHRI", "CHR"),
    ("_FILE", "FILE"),
    ("URL", "WWW"),
    ("_URL", "WWW"),
    ("_WWW", "WWW"),
    ("_EMAIL", "EMAIL"),
    ("EMAI", "EMAIL"),
    ("OBJECT", "OBJE"),
    ("INDIVIDUAL", "INDI"),
    ("FAMILY", "FAM"),
    ("_DEG", "GRAD"),
    ("_MIL", "_MILT"),
    ("_DEATH", "DEAT"),
    ("_FUNERAL", "BURI"),
];

#[derive(Debug, Clone)]
pub struct TagSynonyms {
    map: HashMap<String, String>,
}

impl Default for TagSynonyms {
    fn default() -> Self {
        Self::standard()
    }
}

impl TagSynonyms {
    pub fn standard() -> Self {
        Self {
            map: STANDARD_SYNONYMS
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    /// Standard table plus user-supplied aliases (user entries win).
    pub fn with_extra(extra: &BTreeMap<String, String>) -> Self {
        let mut table = Self::standard();
        for (from, to) in extra {
            table
                .map
                .insert(from.to_ascii_uppercase(), to.to_ascii_uppercase());
        }
        table
    }

    pub fn canonical(&self, tag: &str) -> String {
        let upper = tag.to_ascii_uppercase();
        self.map.get(&upper).cloned().unwrap_or(upper)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_aliases_and_case() {
        let s = TagSynonyms::standard();
        assert_eq!(s.canonical("BAPT"), "BAPM");
        assert_eq!(s.canonical("_url"), "WWW");
        assert_eq!(s.canonical("birt"), "BIRT");
    }

    #[test]
    fn extra_aliases_override() {
        let extra = BTreeMap::from([("_census".to_string(), "cens".to_string())]);
        let s = TagSynonyms::with_extra(&extra);
        assert_eq!(s.canonical("_CENSUS"), "CENS");
        assert_eq!(s.len(), STANDARD_SYNONYMS.len() + 1);
    }
}
