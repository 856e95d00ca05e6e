use lineage_ingest_gedcom::{parse_gedcom, ParserConfig};
use lineage_model::{LivingStatus, RecordGraph};
use lineage_resolve::{resolve, ResolutionError, ResolveConfig};

fn parse(text: &str) -> RecordGraph {
    parse_gedcom(text, &ParserConfig::default())
        .expect("should parse")
        .graph
}

fn config() -> ResolveConfig {
    ResolveConfig {
        current_year: 2026,
        ..ResolveConfig::default()
    }
}

#[test]
fn child_listed_only_by_family_gets_reciprocal_link() {
    let mut g = parse(
        "0 @I1@ INDI\n1 BIRT\n2 DATE 1850\n0 @F1@ FAM\n1 CHIL @I1@\n0 TRLR\n",
    );
    assert!(g.person("I1").is_some_and(|p| p.child_of_families().is_empty()));
    let report = resolve(&mut g, &config());
    assert!(g.person("I1").is_some_and(|p| p.child_of_families().contains("F1")));
    assert_eq!(report.repaired_links, 1);
}

#[test]
fn recent_birth_is_living_ancient_birth_is_dead() {
    let mut g = parse(
        "0 @I1@ INDI\n1 BIRT\n2 DATE 1996\n0 @I2@ INDI\n1 BIRT\n2 DATE 1826\n0 TRLR\n",
    );
    let report = resolve(&mut g, &config());
    assert_eq!(g.person("I1").map(|p| p.living_status()), Some(LivingStatus::Living));
    assert_eq!(g.person("I2").map(|p| p.living_status()), Some(LivingStatus::Dead));
    assert_eq!((report.living, report.dead), (1, 1));
}

#[test]
fn spouse_claim_without_family_listing_uses_gender() {
    let mut g = parse(
        "0 @I1@ INDI\n1 SEX F\n1 FAMS @F1@\n0 @I2@ INDI\n1 SEX M\n1 FAMS @F1@\n0 @F1@ FAM\n1 HUSB @I2@\n0 TRLR\n",
    );
    let report = resolve(&mut g, &config());
    let family = g.family("F1").expect("family");
    assert_eq!(family.wives()[0].key, "I1");
    assert!(report.errors.is_empty());
}

#[test]
fn dangling_references_are_removed_and_reported() {
    let mut g = parse(
        "0 @I1@ INDI\n1 FAMC @F9@\n0 @F1@ FAM\n1 HUSB @I1@\n1 WIFE @I7@\n0 TRLR\n",
    );
    let report = resolve(&mut g, &config());
    assert!(g.person("I1").is_some_and(|p| p.child_of_families().is_empty()));
    assert!(g.family("F1").is_some_and(|f| f.wives().is_empty()));
    assert_eq!(report.removed_dangling, 2);
    assert!(report
        .errors
        .iter()
        .all(|e| matches!(e, ResolutionError::DanglingReference { .. })));
}

#[test]
fn adopted_pedigree_reaches_the_family_child_record() {
    let mut g = parse(
        "0 @I1@ INDI\n1 FAMC @F1@\n2 PEDI adopted\n0 @F1@ FAM\n1 CHIL @I1@\n0 TRLR\n",
    );
    resolve(&mut g, &config());
    assert!(g.family("F1").is_some_and(|f| f.children()[0].adopted));
}

#[test]
fn duplicate_sources_and_repositories_are_folded() {
    let mut g = parse(
        "0 @I1@ INDI\n1 SOUR @S2@\n0 @S1@ SOUR\n1 TITL Register\n1 REPO @R1@\n0 @S2@ SOUR\n1 TITL register\n1 REPO @R1@\n0 @R1@ REPO\n1 NAME Archive\n0 TRLR\n",
    );
    let report = resolve(&mut g, &config());
    assert_eq!(report.folded_sources, 1);
    assert_eq!(g.sources.len(), 1);
    assert!(g.repositories.is_empty());
    assert_eq!(
        g.source("S1").and_then(|s| s.repository_name.as_deref()),
        Some("Archive")
    );
    let person = g.person("I1").expect("person");
    assert_eq!(
        lineage_model::ReferenceContainer::references(person).citations[0]
            .source_key
            .as_deref(),
        Some("S1")
    );
}

#[test]
fn living_status_spreads_through_families() {
    let mut g = parse(
        "0 @I1@ INDI\n1 BIRT\n2 DATE 1990\n1 FAMC @F1@\n\
         0 @I2@ INDI\n1 FAMS @F1@\n\
         0 @I3@ INDI\n1 FAMS @F1@\n1 DEAT\n2 DATE 2001\n\
         0 @F1@ FAM\n1 HUSB @I2@\n1 WIFE @I3@\n1 CHIL @I1@\n0 TRLR\n",
    );
    resolve(&mut g, &config());
    assert_eq!(g.person("I2").map(|p| p.living_status()), Some(LivingStatus::Living));
    assert_eq!(g.person("I3").map(|p| p.living_status()), Some(LivingStatus::Dead));
}
