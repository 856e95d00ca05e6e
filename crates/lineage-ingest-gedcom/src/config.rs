//! Parser configuration.
//!
//! [`ParserSettings`] is the serializable part read from config files;
//! [`ParserConfig`] adds the runtime collaborators built from it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use lineage_model::{DateInterpreter, GedcomDateInterpreter};
use serde::{Deserialize, Serialize};

use crate::synonyms::TagSynonyms;
use crate::temple::TempleCodes;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    /// Count tags with no rule toward the warning total.
    pub unknown_tags_as_warnings: bool,
    /// Extra tag aliases, `FROM = "TO"`.
    pub synonyms: BTreeMap<String, String>,
    /// Extra temple codes, `CODE = "Name"`.
    pub temple_codes: BTreeMap<String, String>,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            unknown_tags_as_warnings: true,
            synonyms: BTreeMap::new(),
            temple_codes: BTreeMap::new(),
        }
    }
}

#[derive(Clone)]
pub struct ParserConfig {
    pub unknown_tags_as_warnings: bool,
    pub synonyms: TagSynonyms,
    pub temples: Arc<TempleCodes>,
    pub dates: Arc<dyn DateInterpreter>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::from_settings(&ParserSettings::default())
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("unknown_tags_as_warnings", &self.unknown_tags_as_warnings)
            .field("synonyms", &self.synonyms.len())
            .finish_non_exhaustive()
    }
}

impl ParserConfig {
    pub fn from_settings(settings: &ParserSettings) -> Self {
        Self {
            unknown_tags_as_warnings: settings.unknown_tags_as_warnings,
            synonyms: TagSynonyms::with_extra(&settings.synonyms),
            temples: TempleCodes::with_extra(&settings.temple_codes),
            dates: Arc::new(GedcomDateInterpreter::new()),
        }
    }

    pub fn with_date_interpreter(mut self, dates: Arc<dyn DateInterpreter>) -> Self {
        self.dates = dates;
        self
    }
}
