use lineage_ingest_gedcom::{parse_gedcom, ParseError, ParserConfig, ParserSettings};
use lineage_model::{
    EventAttribute, EventContainer, EventKind, Gender, ImageLink, NoteLink, ReferenceContainer,
};

const SAMPLE: &str = "\
0 HEAD
1 SOUR FTM
2 NAME Family Tree Maker
2 VERS 22.0
1 CHAR UTF-8
1 SCHEMA
2 INDI
3 _DNA
4 LABL DNA test
0 @I1@ INDI
1 NAME John /Smith/ Jr.
2 GIVN Johnny
2 SOUR @S1@
3 PAGE p. 12
1 SEX M
1 BIRT
2 DATE 12 MAR 1820
2 PLAC Ely, Cambridgeshire
3 MAP
4 LATI N52.4
1 BAPT
2 DATE 1820
1 ENDL
2 TEMP SLAKE
1 _DNA Y-DNA haplogroup R1b
1 ALIA Jack Smith
1 FAMS @F1@
1 NOTE First line
2 CONT second line
2 CONC  continued
1 OBJE
2 FILE photos/john.jpg
2 FORM jpg
2 TITL Portrait
0 @I2@ INDI
1 NAME Mary /Jones/
1 SEX F
1 FAMS @F1@
1 DEAT
2 DATE ABT 1890
2 CAUS Fever
0 @F1@ FAM
1 HUSB @I1@
2 _PREF Y
1 WIFE @I2@
1 CHIL @I3@
2 _FREL Adopted
2 _STAT Biological
1 MARR
2 DATE 5 JUN 1845
2 SOUR Parish register
3 CONT of Ely
0 @S1@ SOUR
1 TITL Census 1851
1 AUTH Home Office
1 REPO @R1@
2 CALN HO 107
1 DATA
2 EVEN CENS
3 DATE 1851
0 @R1@ REPO
1 NAME National Archives
1 ADDR Kew
2 CITY Richmond
2 CTRY England
0 @N1@ NOTE A shared note
1 CONT spanning lines
0 TRLR
";

#[test]
fn parses_a_realistic_file() {
    let parsed = parse_gedcom(SAMPLE, &ParserConfig::default()).expect("should parse");
    let g = &parsed.graph;
    let stats = g.stats();
    assert_eq!(stats.people, 2);
    assert_eq!(stats.families, 1);
    assert_eq!(stats.sources, 1);
    assert_eq!(stats.repositories, 1);
    assert_eq!(stats.notes, 1);
    assert_eq!(parsed.report.warnings, 0, "{:?}", parsed.report.diagnostics);
    assert!(!parsed.report.had_unknown_tag);
    assert_eq!(parsed.report.source_program.as_deref(), Some("Family Tree Maker"));
    assert_eq!(parsed.report.custom_tags, 1);

    let john = g.person("I1").expect("I1");
    assert_eq!(john.gender(), Gender::Male);
    let name = john.name().expect("name");
    assert_eq!(name.given.as_deref(), Some("Johnny"));
    assert_eq!(name.surname.as_deref(), Some("Smith"));
    assert_eq!(name.suffix.as_deref(), Some("Jr."));
    assert_eq!(name.refs.citations.len(), 1);
    assert_eq!(name.refs.citations[0].page.as_deref(), Some("p. 12"));

    let birth = john.first_event(EventKind::Birth).expect("birth");
    assert_eq!(birth.date_text(), Some("12 MAR 1820"));
    assert_eq!(birth.place(), Some("Ely, Cambridgeshire"));
    assert!(john.has_event(&[EventKind::Baptism]));

    let endowment = john.first_event(EventKind::LdsEndowment).expect("endowment");
    assert_eq!(
        endowment.attribute(EventAttribute::Temple),
        Some("Salt Lake City, Utah")
    );

    let dna = john.first_event(EventKind::Other).expect("custom event");
    assert_eq!(dna.description(), Some("DNA test"));
    assert_eq!(dna.content(), Some("Y-DNA haplogroup R1b"));

    assert_eq!(
        john.references().notes,
        vec![NoteLink::Inline("First line\nsecond line continued".into())]
    );
    assert_eq!(john.references().ignored, vec!["Alias: Jack Smith".to_string()]);
    assert_eq!(
        john.references().images,
        vec![ImageLink::File {
            path: "photos/john.jpg".into(),
            title: Some("Portrait".into()),
            format: Some("jpg".into()),
        }]
    );

    let mary = g.person("I2").expect("I2");
    let death = mary.first_event(EventKind::Death).expect("death");
    assert_eq!(death.attribute(EventAttribute::Cause), Some("Fever"));

    let family = g.family("F1").expect("F1");
    assert!(family.husbands()[0].preferred);
    assert_eq!(family.wives()[0].key, "I2");
    let child = &family.children()[0];
    assert_eq!(child.key, "I3");
    assert!(child.adopted);
    assert_eq!(child.status.as_deref(), Some("Biological"));
    let marriage = family.first_event(EventKind::Marriage).expect("marriage");
    assert_eq!(
        marriage.references().citations[0].title.as_deref(),
        Some("Parish register\nof Ely")
    );

    let source = g.source("S1").expect("S1");
    assert_eq!(source.title.as_deref(), Some("Census 1851"));
    assert_eq!(source.repositories[0].key.as_deref(), Some("R1"));
    assert_eq!(source.repositories[0].call_number.as_deref(), Some("HO 107"));
    assert_eq!(source.events.len(), 1);

    let repo = &g.repositories["R1"];
    assert_eq!(repo.address.as_deref(), Some("Kew\nRichmond\nEngland"));
    assert_eq!(g.notes["N1"].text, "A shared note\nspanning lines");
}

#[test]
fn unknown_tags_flag_the_file_and_keep_their_text() {
    let text = "0 @I1@ INDI\n1 _ODDITY strange value\n2 _DEEPER more\n0 TRLR\n";
    let parsed = parse_gedcom(text, &ParserConfig::default()).expect("should parse");
    assert!(parsed.report.had_unknown_tag);
    assert_eq!(parsed.report.warnings, 1);
    let p = parsed.graph.person("I1").expect("I1");
    assert_eq!(
        p.references().ignored,
        vec!["_ODDITY: strange value".to_string(), "_DEEPER: more".to_string()]
    );
}

#[test]
fn unknown_tags_can_be_informational() {
    let settings = ParserSettings {
        unknown_tags_as_warnings: false,
        ..ParserSettings::default()
    };
    let config = ParserConfig::from_settings(&settings);
    let parsed = parse_gedcom("0 @I1@ INDI\n1 _ODDITY x\n", &config).expect("should parse");
    assert!(parsed.report.had_unknown_tag);
    assert_eq!(parsed.report.warnings, 0);
}

#[test]
fn text_under_a_structural_tag_is_dropped_with_warning() {
    let parsed =
        parse_gedcom("0 @F1@ FAM stray text\n1 HUSB @I1@\n", &ParserConfig::default())
            .expect("should parse");
    assert_eq!(parsed.report.warnings, 1);
    assert_eq!(parsed.graph.family("F1").map(|f| f.husbands().len()), Some(1));
}

#[test]
fn person_without_identifier_is_dropped() {
    let parsed = parse_gedcom("0 INDI\n1 NAME Nobody\n0 @I2@ INDI\n", &ParserConfig::default())
        .expect("should parse");
    assert_eq!(parsed.graph.stats().people, 1);
    assert_eq!(parsed.report.dropped_records, 1);
    assert_eq!(parsed.report.warnings, 1);
}

#[test]
fn family_without_identifier_is_fatal_and_keeps_warning_count() {
    let text = "0 @I1@ INDI\n1 _ODDITY x\n0 FAM\n1 HUSB @I1@\n";
    let err = parse_gedcom(text, &ParserConfig::default()).unwrap_err();
    assert!(matches!(err, ParseError::MissingIdentifier { ref tag, .. } if tag == "FAM"));
    assert_eq!(err.warnings(), 1);
}

#[test]
fn source_without_identifier_is_fatal() {
    let err = parse_gedcom("0 SOUR\n1 TITL Lost\n", &ParserConfig::default()).unwrap_err();
    assert!(matches!(err, ParseError::MissingIdentifier { .. }));
}

#[test]
fn duplicate_person_records_merge() {
    let text = "0 @I1@ INDI\n1 NAME A /B/\n0 @I1@ INDI\n1 BIRT\n2 DATE 1900\n";
    let parsed = parse_gedcom(text, &ParserConfig::default()).expect("should parse");
    let p = parsed.graph.person("I1").expect("I1");
    assert!(p.name().is_some());
    assert!(p.has_event(&[EventKind::Birth]));
    assert_eq!(parsed.report.merged_records, 1);
}

#[test]
fn pedigree_is_kept_on_the_person() {
    let text = "0 @I3@ INDI\n1 FAMC @F1@\n2 PEDI adopted\n";
    let parsed = parse_gedcom(text, &ParserConfig::default()).expect("should parse");
    let p = parsed.graph.person("I3").expect("I3");
    assert!(p.child_of_families().contains("F1"));
    assert_eq!(p.pedigree("F1"), Some("adopted"));
}

#[test]
fn malformed_lines_are_skipped_with_warning() {
    let text = "0 @I1@ INDI\nthis is not gedcom\n1 SEX F\n";
    let parsed = parse_gedcom(text, &ParserConfig::default()).expect("should parse");
    assert_eq!(parsed.report.warnings, 1);
    assert_eq!(parsed.graph.person("I1").map(|p| p.gender()), Some(Gender::Female));
}

#[test]
fn repeated_citation_keeps_detail_from_every_copy() {
    let text = "0 @I1@ INDI\n1 SOUR @S1@\n1 SOUR @S1@\n2 EVEN BIRT\n0 @S1@ SOUR\n1 TITL Census\n";
    let parsed = parse_gedcom(text, &ParserConfig::default()).expect("should parse");
    let p = parsed.graph.person("I1").expect("I1");
    let citations = &p.references().citations;
    assert_eq!(citations.len(), 1);
    let hits = citations[0]
        .refs
        .ignored
        .iter()
        .filter(|line| line.as_str() == "Event cited: BIRT")
        .count();
    assert_eq!(hits, 1);
}

#[test]
fn carriage_return_only_files_parse() {
    let text = "0 @I1@ INDI\r1 NAME Ann /Lee/\r1 SEX F\r0 TRLR\r";
    let parsed = parse_gedcom(text, &ParserConfig::default()).expect("should parse");
    assert_eq!(parsed.report.warnings, 0);
    assert_eq!(parsed.graph.person("I1").map(|p| p.gender()), Some(Gender::Female));
}

#[test]
fn captured_lines_under_an_event_stay_on_the_event() {
    let text = "0 @I1@ INDI\n1 BAPM\n2 DATE 1820\n2 RELI Methodist\n0 TRLR\n";
    let parsed = parse_gedcom(text, &ParserConfig::default()).expect("should parse");
    let p = parsed.graph.person("I1").expect("I1");
    let baptism = p.first_event(EventKind::Baptism).expect("baptism");
    assert_eq!(baptism.references().ignored, vec!["Religion: Methodist".to_string()]);
    assert!(p.references().ignored.is_empty());
}
