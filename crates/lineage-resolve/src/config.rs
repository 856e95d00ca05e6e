use chrono::Datelike;
use lineage_model::date::first_day_of_year;
use serde::{Deserialize, Serialize};

/// Thresholds for resolution. Ages are in years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Anyone whose latest possible birth year is more than this many years
    /// ago is presumed dead.
    pub max_lifespan_years: i32,
    /// Year used as "now"; defaults to the local clock.
    pub current_year: i32,
    pub cutoff_year: i32,
    /// Cutoff used for trusted uploaders; later than `cutoff_year`, so more
    /// people fall before it.
    pub trusted_cutoff_year: i32,
    pub trusted_uploader: bool,
    /// Also spread "living" from a person to the spouses and children of
    /// their own marriages, not only to their parent family.
    pub living_spreads_through_spouse_families: bool,
    pub min_parent_age: i32,
    pub max_mother_age: i32,
    pub max_father_age: i32,
    pub max_age: i32,
    pub gestation_days: i32,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            max_lifespan_years: 110,
            current_year: chrono::Local::now().year(),
            cutoff_year: 1750,
            trusted_cutoff_year: 1850,
            trusted_uploader: false,
            living_spreads_through_spouse_families: false,
            min_parent_age: 16,
            max_mother_age: 70,
            max_father_age: 80,
            max_age: 115,
            gestation_days: 270,
        }
    }
}

impl ResolveConfig {
    pub fn effective_cutoff_year(&self) -> i32 {
        if self.trusted_uploader {
            self.trusted_cutoff_year
        } else {
            self.cutoff_year
        }
    }

    /// Day number of January 1st of the effective cutoff year.
    pub fn cutoff_day(&self) -> i32 {
        first_day_of_year(self.effective_cutoff_year())
    }

    pub fn max_parent_age(&self) -> i32 {
        self.max_mother_age.max(self.max_father_age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trusted_uploaders_get_the_later_cutoff() {
        let mut c = ResolveConfig::default();
        let ordinary = c.cutoff_day();
        c.trusted_uploader = true;
        assert!(c.cutoff_day() > ordinary);
        assert_eq!(c.effective_cutoff_year(), 1850);
    }

    #[test]
    fn partial_toml_style_input_keeps_defaults() {
        let c: ResolveConfig =
            serde_json::from_str(r#"{"max_lifespan_years": 100}"#).expect("should parse");
        assert_eq!(c.max_lifespan_years, 100);
        assert_eq!(c.min_parent_age, 16);
    }
}
