//! LDS temple code lookup.
//!
//! Loaded once and shared read-only by every parser instance.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;

const KNOWN_TEMPLES: &[(&str, &str)] = &[
    ("ABA", "Aba, Nigeria"),
    ("ACCRA", "Accra, Ghana"),
    ("ADELA", "Adelaide, Australia"),
    ("ALBER", "Cardston, Alberta"),
    ("ALBUQ", "Albuquerque, New Mexico"),
    ("ATLAN", "Atlanta, Georgia"),
    ("BAIRE", "Buenos Aires, Argentina"),
    ("BILLI", "Billings, Montana"),
    ("BOGOT", "Bogota, Colombia"),
    ("BOISE", "Boise, Idaho"),
    ("BOSTO", "Boston, Massachusetts"),
    ("BOUNT", "Bountiful, Utah"),
    ("CHICA", "Chicago, Illinois"),
    ("DALLA", "Dallas, Texas"),
    ("DENVE", "Denver, Colorado"),
    ("FRANK", "Frankfurt, Germany"),
    ("HAWAI", "Laie, Hawaii"),
    ("HKONG", "Hong Kong"),
    ("IFALL", "Idaho Falls, Idaho"),
    ("JRIVE", "Jordan River, Utah"),
    ("LANGE", "Los Angeles, California"),
    ("LOGAN", "Logan, Utah"),
    ("LONDO", "London, England"),
    ("LVEGA", "Las Vegas, Nevada"),
    ("MANTI", "Manti, Utah"),
    ("MEXIC", "Mexico City, Mexico"),
    ("MTIMP", "Mount Timpanogos, Utah"),
    ("NZEAL", "Hamilton, New Zealand"),
    ("OAKLA", "Oakland, California"),
    ("OGDEN", "Ogden, Utah"),
    ("PORTL", "Portland, Oregon"),
    ("PROVO", "Provo, Utah"),
    ("SAOPA", "Sao Paulo, Brazil"),
    ("SDIEG", "San Diego, California"),
    ("SEATT", "Seattle, Washington"),
    ("SEOUL", "Seoul, Korea"),
    ("SGEOR", "St. George, Utah"),
    ("SLAKE", "Salt Lake City, Utah"),
    ("SLOUI", "St. Louis, Missouri"),
    ("STOCK", "Stockholm, Sweden"),
    ("SWISS", "Bern, Switzerland"),
    ("SYDNE", "Sydney, Australia"),
    ("TOKYO", "Tokyo, Japan"),
    ("TORON", "Toronto, Ontario"),
    ("WASHI", "Washington, D.C."),
];

#[derive(Debug, Clone, Default)]
pub struct TempleCodes {
    names: HashMap<String, String>,
}

static STANDARD_TEMPLES: Lazy<Arc<TempleCodes>> = Lazy::new(|| {
    Arc::new(TempleCodes {
        names: KNOWN_TEMPLES
            .iter()
            .map(|(code, name)| (code.to_string(), name.to_string()))
            .collect(),
    })
});

impl TempleCodes {
    /// The built-in table, shared.
    pub fn standard() -> Arc<TempleCodes> {
        Arc::clone(&STANDARD_TEMPLES)
    }

    /// Built-in table plus extra codes; returns the shared table when there
    /// is nothing to add.
    pub fn with_extra(extra: &BTreeMap<String, String>) -> Arc<TempleCodes> {
        if extra.is_empty() {
            return Self::standard();
        }
        let mut table = TempleCodes::clone(&STANDARD_TEMPLES);
        for (code, name) in extra {
            table.names.insert(code.to_ascii_uppercase(), name.clone());
        }
        Arc::new(table)
    }

    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.names
            .get(&code.trim().to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Temple name for a code, or the code itself when unknown.
    pub fn name_or_code<'a>(&'a self, code: &'a str) -> &'a str {
        self.lookup(code).unwrap_or_else(|| code.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_shared() {
        let a = TempleCodes::standard();
        let b = TempleCodes::with_extra(&BTreeMap::new());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.lookup("slake"), Some("Salt Lake City, Utah"));
        assert_eq!(a.name_or_code(" XYZZY "), "XYZZY");
    }

    #[test]
    fn extra_codes_extend_a_copy() {
        let extra = BTreeMap::from([("zz".to_string(), "Test Temple".to_string())]);
        let t = TempleCodes::with_extra(&extra);
        assert_eq!(t.lookup("ZZ"), Some("Test Temple"));
        assert!(TempleCodes::standard().lookup("ZZ").is_none());
    }
}
