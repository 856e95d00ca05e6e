//! `lineage.toml`: parser settings and resolution thresholds.
//!
//! ```toml
//! [parser]
//! unknown_tags_as_warnings = false
//!
//! [parser.synonyms]
//! _DEG = "EDUC"
//!
//! [resolve]
//! cutoff_year = 1760
//! trusted_uploader = true
//! ```

use std::path::{Path, PathBuf};

use lineage_ingest_gedcom::{ParserConfig, ParserSettings};
use lineage_resolve::ResolveConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot render config: {0}")]
    Render(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageConfig {
    pub parser: ParserSettings,
    pub resolve: ResolveConfig,
}

impl LineageConfig {
    /// Reads `path`; missing sections and keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig::from_settings(&self.parser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[resolve]\ncutoff_year = 1760\n\n[parser.synonyms]\n_DEG = \"EDUC\"").expect("write");

        let config = LineageConfig::load(file.path()).expect("should load");
        assert_eq!(config.resolve.cutoff_year, 1760);
        assert_eq!(config.resolve.max_lifespan_years, 110);
        assert!(config.parser.unknown_tags_as_warnings);
        assert_eq!(config.parser.synonyms.get("_DEG").map(String::as_str), Some("EDUC"));
    }

    #[test]
    fn rendered_config_loads_back() {
        let config = LineageConfig::default();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(config.to_toml().expect("render").as_bytes())
            .expect("write");
        assert_eq!(LineageConfig::load(file.path()).expect("should load"), config);
    }

    #[test]
    fn bad_toml_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[resolve\ncutoff_year = ").expect("write");
        let err = LineageConfig::load(file.path()).expect_err("should fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = LineageConfig::load(&dir.path().join("absent.toml")).expect_err("should fail");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
