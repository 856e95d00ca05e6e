use serde::Serialize;
use thiserror::Error;

/// Recoverable problems found while repairing the graph. They are collected
/// on the report, never returned early.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionError {
    #[error("person {person} claims family {family} but has no gender and the family has no open spouse slot")]
    AmbiguousGender { person: String, family: String },

    #[error("{owner} refers to missing {relation} {target}")]
    DanglingReference {
        owner: String,
        relation: &'static str,
        target: String,
    },
}
