//! The `(parent context, child tag)` dispatch table.
//!
//! GEDCOM is not context-free: `DATE` under `BIRT` is an event attribute,
//! under `SOUR.DATA` a citation date, under `HEAD` noise. Every frame on the
//! automaton's stack carries a [`Context`] computed from its parent's context
//! and its own tag, so the whole chain of enclosing tags is folded into one
//! value and a flat table can decide what to do with each child.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use lineage_model::{EventKind, EventScope};
use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Context {
    Root,
    Header,
    HeaderSource,
    Schema,
    SchemaRecord,
    SchemaTag,
    Person,
    Name,
    PersonEvent,
    FamilyLink,
    Family,
    FamilyEvent,
    SpouseLink,
    ChildLink,
    Source,
    SourceData,
    SourceEvent,
    RepositoryLink,
    Repository,
    Address,
    NoteRecord,
    Note,
    Citation,
    CitationData,
    ImageRecord,
    Image,
    ImageFile,
    Place,
    Value,
    Continuation,
    Ignored,
}

impl Context {
    /// Whether `Text` events are accepted on a frame of this context.
    pub fn accepts_text(self) -> bool {
        matches!(
            self,
            Context::HeaderSource
                | Context::Name
                | Context::PersonEvent
                | Context::FamilyLink
                | Context::FamilyEvent
                | Context::SpouseLink
                | Context::ChildLink
                | Context::SourceEvent
                | Context::RepositoryLink
                | Context::Address
                | Context::NoteRecord
                | Context::Note
                | Context::Citation
                | Context::Image
                | Context::ImageFile
                | Context::Place
                | Context::Value
                | Context::Continuation
                | Context::Ignored
        )
    }

    /// Top-level record contexts finalized into the graph.
    pub fn is_record(self) -> bool {
        matches!(
            self,
            Context::Person
                | Context::Family
                | Context::Source
                | Context::Repository
                | Context::NoteRecord
                | Context::ImageRecord
        )
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Push a modeled frame (and start a builder if the context has one).
    Model,
    /// Discard the subtree without a trace.
    SilentIgnore,
    /// Discard the subtree structurally but keep its text as `Label: text`
    /// on the enclosing modeled frame.
    CaptureIgnore,
    /// Like `CaptureIgnore`, and flag the file: no rule covers this tag.
    Unknown,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Model => "model",
            Action::SilentIgnore => "ignore",
            Action::CaptureIgnore => "capture",
            Action::Unknown => "unknown",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub action: Action,
    /// Context of the pushed frame (`Ignored` unless `action` is `Model`).
    pub context: Context,
}

impl Rule {
    const fn model(context: Context) -> Self {
        Self {
            action: Action::Model,
            context,
        }
    }

    const fn ignore(action: Action) -> Self {
        Self {
            action,
            context: Context::Ignored,
        }
    }

    pub const SILENT: Rule = Rule::ignore(Action::SilentIgnore);
    pub const CAPTURE: Rule = Rule::ignore(Action::CaptureIgnore);
    pub const UNKNOWN: Rule = Rule::ignore(Action::Unknown);
}

// ============================================================================
// Table
// ============================================================================

#[derive(Debug, Clone)]
pub struct RuleTable {
    rows: HashMap<(Context, String), Rule>,
    defaults: HashMap<Context, Rule>,
}

/// Shared standard table; it never changes after construction.
pub static STANDARD_RULES: Lazy<RuleTable> = Lazy::new(RuleTable::standard);

const RECORD_NOISE: &[&str] = &[
    "CHAN", "RIN", "RFN", "AFN", "REFN", "_UID", "UID", "_UPD", "SUBM", "ANCI", "DESI", "RESN",
    "_FLGS", "_NEW", "_FSFTID", "_CHECKED", "_TODO", "_PRIM", "_COLOR", "_EXCLUDED", "EXID",
];

const EVENT_NOISE: &[&str] = &["RIN", "_UID", "CHAN", "_PRIM", "_SDATE", "_SENT", "_ALT", "_OVER"];

impl RuleTable {
    pub fn lookup(&self, parent: Context, tag: &str) -> Option<Rule> {
        self.rows.get(&(parent, tag.to_string())).copied()
    }

    /// Row lookup falling back to the parent context's default.
    pub fn resolve(&self, parent: Context, tag: &str) -> Rule {
        if matches!(tag, "CONT" | "CONC") && parent.accepts_text() && parent != Context::Ignored {
            return Rule::model(Context::Continuation);
        }
        self.lookup(parent, tag)
            .or_else(|| self.defaults.get(&parent).copied())
            .unwrap_or(Rule::UNKNOWN)
    }

    /// All explicit rows, sorted by context then tag.
    pub fn rows(&self) -> Vec<(Context, &str, Rule)> {
        let sorted: BTreeMap<(Context, &str), Rule> = self
            .rows
            .iter()
            .map(|((ctx, tag), rule)| ((*ctx, tag.as_str()), *rule))
            .collect();
        sorted
            .into_iter()
            .map(|((ctx, tag), rule)| (ctx, tag, rule))
            .collect()
    }

    pub fn default_for(&self, parent: Context) -> Rule {
        self.defaults.get(&parent).copied().unwrap_or(Rule::UNKNOWN)
    }

    /// Contexts with an explicit fallback rule, sorted.
    pub fn defaults(&self) -> Vec<(Context, Rule)> {
        let sorted: BTreeMap<Context, Rule> =
            self.defaults.iter().map(|(ctx, rule)| (*ctx, *rule)).collect();
        sorted.into_iter().collect()
    }

    fn row(&mut self, parent: Context, tags: &[&str], rule: Rule) {
        for tag in tags {
            self.rows.insert((parent, (*tag).to_string()), rule);
        }
    }

    fn reference_rows(&mut self, parent: Context) {
        self.row(parent, &["NOTE"], Rule::model(Context::Note));
        self.row(parent, &["SOUR"], Rule::model(Context::Citation));
        self.row(parent, &["OBJE"], Rule::model(Context::Image));
    }

    fn event_rows(&mut self, parent: Context, event: Context) {
        let family = parent == Context::Family;
        for kind in EventKind::ALL {
            let in_scope = match kind.scope() {
                EventScope::Both => true,
                EventScope::Person => !family,
                EventScope::Family => family,
            };
            if in_scope {
                self.row(parent, &[kind.tag()], Rule::model(event));
            }
        }
        self.row(parent, &["FACT"], Rule::model(event));
    }

    fn event_body_rows(&mut self, event: Context) {
        self.row(
            event,
            &["DATE", "AGE", "CAUS", "TYPE", "TEMP", "STAT", "AGNC"],
            Rule::model(Context::Value),
        );
        self.row(event, &["PLAC"], Rule::model(Context::Place));
        self.reference_rows(event);
        self.row(event, &["ADDR", "PHON", "EMAIL", "WWW", "HUSB", "WIFE", "RELI", "FAMC"], Rule::CAPTURE);
        self.row(event, EVENT_NOISE, Rule::SILENT);
    }

    /// The standard table for GEDCOM 5.5/5.5.1 plus common vendor tags.
    pub fn standard() -> Self {
        use Context as C;

        let mut t = RuleTable {
            rows: HashMap::new(),
            defaults: HashMap::new(),
        };

        // Root
        t.row(C::Root, &["HEAD"], Rule::model(C::Header));
        t.row(C::Root, &["INDI"], Rule::model(C::Person));
        t.row(C::Root, &["FAM"], Rule::model(C::Family));
        t.row(C::Root, &["SOUR"], Rule::model(C::Source));
        t.row(C::Root, &["REPO"], Rule::model(C::Repository));
        t.row(C::Root, &["NOTE"], Rule::model(C::NoteRecord));
        t.row(C::Root, &["OBJE"], Rule::model(C::ImageRecord));
        t.row(
            C::Root,
            &["TRLR", "SUBM", "SUBN", "_EVDEF", "_EVENT_DEFN", "_PLAC_DEFN", "_PLAC", "_TODO", "_LOC"],
            Rule::SILENT,
        );

        // Header
        t.row(C::Header, &["SOUR"], Rule::model(C::HeaderSource));
        t.row(C::Header, &["SCHEMA"], Rule::model(C::Schema));
        t.defaults.insert(C::Header, Rule::SILENT);
        t.row(C::HeaderSource, &["NAME"], Rule::model(C::Value));
        t.defaults.insert(C::HeaderSource, Rule::SILENT);
        t.row(C::Schema, &["INDI", "FAM"], Rule::model(C::SchemaRecord));
        t.defaults.insert(C::Schema, Rule::SILENT);
        t.defaults.insert(C::SchemaRecord, Rule::model(C::SchemaTag));
        t.row(C::SchemaTag, &["LABL"], Rule::model(C::Value));
        t.defaults.insert(C::SchemaTag, Rule::SILENT);

        // Person
        t.row(C::Person, &["NAME"], Rule::model(C::Name));
        t.row(C::Person, &["SEX"], Rule::model(C::Value));
        t.row(C::Person, &["FAMC", "FAMS"], Rule::model(C::FamilyLink));
        t.event_rows(C::Person, C::PersonEvent);
        t.reference_rows(C::Person);
        t.row(C::Person, RECORD_NOISE, Rule::SILENT);
        t.row(
            C::Person,
            &["ALIA", "ASSO", "ADDR", "PHON", "EMAIL", "WWW", "_MARNM", "NCHI", "NMR", "IDNO", "_AKA"],
            Rule::CAPTURE,
        );
        t.event_body_rows(C::PersonEvent);
        t.row(C::PersonEvent, &["_FREL", "_MREL"], Rule::SILENT);

        // Name
        t.row(
            C::Name,
            &["GIVN", "SURN", "NPFX", "NSFX", "NICK", "SPFX", "TYPE"],
            Rule::model(C::Value),
        );
        t.row(C::Name, &["SOUR"], Rule::model(C::Citation));
        t.row(C::Name, &["NOTE"], Rule::model(C::Note));
        t.row(C::Name, &["_MARNM", "_AKA", "ROMN", "FONE", "_RUFNAME"], Rule::CAPTURE);
        t.row(C::Name, &["_PRIM", "_TYPE"], Rule::SILENT);

        // FAMC / FAMS on a person
        t.row(C::FamilyLink, &["PEDI", "_FREL", "_MREL"], Rule::model(C::Value));
        t.row(C::FamilyLink, &["STAT", "NOTE", "SOUR"], Rule::CAPTURE);
        t.row(C::FamilyLink, &["_PRIMARY", "_PREF"], Rule::SILENT);

        // Family
        t.row(C::Family, &["HUSB", "WIFE"], Rule::model(C::SpouseLink));
        t.row(C::Family, &["CHIL"], Rule::model(C::ChildLink));
        t.event_rows(C::Family, C::FamilyEvent);
        t.reference_rows(C::Family);
        t.row(C::Family, RECORD_NOISE, Rule::SILENT);
        t.row(C::Family, &["NCHI", "_STAT", "_MSTAT", "ADDR"], Rule::CAPTURE);
        t.event_body_rows(C::FamilyEvent);
        t.row(C::SpouseLink, &["_PREF"], Rule::model(C::Value));
        t.row(C::SpouseLink, &["AGE", "NOTE"], Rule::CAPTURE);
        t.row(C::ChildLink, &["_FREL", "_MREL", "PEDI", "_STAT", "STAT"], Rule::model(C::Value));
        t.row(C::ChildLink, &["NOTE", "SOUR"], Rule::CAPTURE);
        t.row(C::ChildLink, &["_PREF", "_PRIMARY"], Rule::SILENT);

        // Source record
        t.row(
            C::Source,
            &["TITL", "AUTH", "PUBL", "ABBR", "TEXT", "CALN"],
            Rule::model(C::Value),
        );
        t.row(C::Source, &["DATA"], Rule::model(C::SourceData));
        t.row(C::Source, &["REPO"], Rule::model(C::RepositoryLink));
        t.row(C::Source, &["NOTE"], Rule::model(C::Note));
        t.row(C::Source, &["OBJE"], Rule::model(C::Image));
        t.row(C::Source, &["_TYPE", "MEDI", "_MEDI", "_SUBQ", "_BIBL", "_ITALIC", "_PAREN"], Rule::CAPTURE);
        t.row(C::Source, RECORD_NOISE, Rule::SILENT);
        t.row(C::Source, &["SOUR"], Rule::SILENT);
        t.row(C::SourceData, &["EVEN"], Rule::model(C::SourceEvent));
        t.row(C::SourceData, &["AGNC", "TEXT"], Rule::model(C::Value));
        t.row(C::SourceData, &["NOTE"], Rule::model(C::Note));
        t.row(C::SourceData, &["DATE"], Rule::CAPTURE);
        t.row(C::SourceEvent, &["DATE"], Rule::model(C::Value));
        t.row(C::SourceEvent, &["PLAC"], Rule::model(C::Place));
        t.defaults.insert(C::SourceEvent, Rule::SILENT);
        t.row(C::RepositoryLink, &["CALN", "NAME", "MEDI"], Rule::model(C::Value));
        t.row(C::RepositoryLink, &["NOTE", "ADDR"], Rule::CAPTURE);

        // Repository record
        t.row(
            C::Repository,
            &["NAME", "PHON", "EMAIL", "WWW"],
            Rule::model(C::Value),
        );
        t.row(C::Repository, &["ADDR"], Rule::model(C::Address));
        t.row(C::Repository, &["NOTE"], Rule::model(C::Note));
        t.row(C::Repository, RECORD_NOISE, Rule::SILENT);
        t.row(
            C::Address,
            &["ADR1", "ADR2", "ADR3", "CITY", "STAE", "POST", "CTRY"],
            Rule::model(C::Value),
        );
        t.row(C::Address, &["PHON", "EMAIL", "WWW"], Rule::CAPTURE);

        // Notes
        t.row(C::NoteRecord, &["SOUR"], Rule::model(C::Citation));
        t.row(C::NoteRecord, RECORD_NOISE, Rule::SILENT);
        t.row(C::Note, &["SOUR", "_DESCRIPTION"], Rule::SILENT);

        // Citations
        t.row(C::Citation, &["PAGE", "QUAY", "TEXT"], Rule::model(C::Value));
        t.row(C::Citation, &["DATA"], Rule::model(C::CitationData));
        t.row(C::Citation, &["NOTE"], Rule::model(C::Note));
        t.row(C::Citation, &["OBJE"], Rule::model(C::Image));
        t.row(C::Citation, &["EVEN", "ROLE"], Rule::CAPTURE);
        t.row(C::Citation, &["_APID", "_LINK", "RIN", "_TMPLT", "_QUAL"], Rule::SILENT);
        t.row(C::CitationData, &["DATE", "TEXT"], Rule::model(C::Value));
        t.row(C::CitationData, &["_LINK", "_APID"], Rule::SILENT);

        // Images
        for image in [C::ImageRecord, C::Image] {
            t.row(image, &["FILE"], Rule::model(C::ImageFile));
            t.row(image, &["FORM", "TITL"], Rule::model(C::Value));
            t.row(
                image,
                &["_PRIM", "_TYPE", "_SCBK", "_CUTOUT", "_POSITION", "_DATE", "_SIZE", "BLOB", "_PHOTO_RIN", "_FILESIZE"],
                Rule::SILENT,
            );
            t.row(image, RECORD_NOISE, Rule::SILENT);
        }
        t.row(C::ImageRecord, &["NOTE"], Rule::model(C::Note));
        t.row(C::ImageRecord, &["SOUR"], Rule::model(C::Citation));
        t.row(C::Image, &["NOTE"], Rule::CAPTURE);
        t.row(C::ImageFile, &["FORM", "TITL"], Rule::model(C::Value));
        t.defaults.insert(C::ImageFile, Rule::SILENT);

        // Places and plain values
        t.row(C::Place, &["FORM", "MAP", "LATI", "LONG", "FONE", "ROMN", "_GOV"], Rule::SILENT);
        t.row(C::Place, &["NOTE", "SOUR"], Rule::CAPTURE);
        t.row(C::Value, &["TIME", "MEDI", "FORM", "TYPE", "_PREF"], Rule::SILENT);

        t
    }
}

// ============================================================================
// Labels for captured text
// ============================================================================

static TAG_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("ALIA", "Alias"),
        ("ASSO", "Associate"),
        ("ADDR", "Address"),
        ("ADR1", "Address"),
        ("ADR2", "Address"),
        ("ADR3", "Address"),
        ("CITY", "City"),
        ("STAE", "State"),
        ("POST", "Postal code"),
        ("CTRY", "Country"),
        ("PHON", "Phone"),
        ("EMAIL", "Email"),
        ("WWW", "Web site"),
        ("_MARNM", "Married name"),
        ("_AKA", "Also known as"),
        ("_RUFNAME", "Called name"),
        ("ROMN", "Romanized"),
        ("FONE", "Phonetic"),
        ("NCHI", "Number of children"),
        ("NMR", "Number of marriages"),
        ("IDNO", "Identification number"),
        ("STAT", "Status"),
        ("_STAT", "Status"),
        ("_MSTAT", "Marriage status"),
        ("NOTE", "Note"),
        ("SOUR", "Source"),
        ("HUSB", "Husband"),
        ("WIFE", "Wife"),
        ("AGE", "Age"),
        ("RELI", "Religion"),
        ("FAMC", "Family"),
        ("ADOP", "Adopted by"),
        ("EVEN", "Event cited"),
        ("ROLE", "Role"),
        ("RELA", "Relationship"),
        ("DATE", "Date"),
        ("PLAC", "Place"),
        ("TEXT", "Text"),
        ("TYPE", "Type"),
        ("_TYPE", "Type"),
        ("MEDI", "Media"),
        ("_MEDI", "Media"),
        ("_SUBQ", "Short citation"),
        ("_BIBL", "Bibliography"),
        ("_ITALIC", "Italic title"),
        ("_PAREN", "Parenthesized"),
        ("PAGE", "Page"),
        ("CAUS", "Cause"),
    ])
});

/// Human-readable label for a tag; unlabeled tags render as themselves.
pub fn label_for(tag: &str) -> &str {
    TAG_LABELS.get(tag).copied().unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_depends_on_context() {
        let t = RuleTable::standard();
        assert_eq!(t.resolve(Context::PersonEvent, "DATE"), Rule::model(Context::Value));
        assert_eq!(t.resolve(Context::CitationData, "DATE"), Rule::model(Context::Value));
        assert_eq!(t.resolve(Context::SourceData, "DATE").action, Action::CaptureIgnore);
        assert_eq!(t.resolve(Context::Header, "DATE").action, Action::SilentIgnore);
    }

    #[test]
    fn event_tags_respect_scope() {
        let t = RuleTable::standard();
        assert_eq!(t.resolve(Context::Person, "BIRT"), Rule::model(Context::PersonEvent));
        assert_eq!(t.resolve(Context::Family, "MARR"), Rule::model(Context::FamilyEvent));
        assert_eq!(t.resolve(Context::Person, "MARR").action, Action::Unknown);
        assert_eq!(t.resolve(Context::Family, "CENS"), Rule::model(Context::FamilyEvent));
    }

    #[test]
    fn continuation_only_under_text_frames() {
        let t = RuleTable::standard();
        assert_eq!(t.resolve(Context::Note, "CONT"), Rule::model(Context::Continuation));
        assert_eq!(t.resolve(Context::Value, "CONC"), Rule::model(Context::Continuation));
        assert_eq!(t.resolve(Context::Person, "CONT").action, Action::Unknown);
    }

    #[test]
    fn unmatched_tags_fall_back_to_defaults() {
        let t = RuleTable::standard();
        assert_eq!(t.resolve(Context::Person, "_WEIRD").action, Action::Unknown);
        assert_eq!(t.resolve(Context::SchemaRecord, "_DNA"), Rule::model(Context::SchemaTag));
        assert_eq!(t.resolve(Context::ImageFile, "_CROP").action, Action::SilentIgnore);
    }

    #[test]
    fn every_model_row_targets_a_real_context() {
        for (ctx, tag, rule) in STANDARD_RULES.rows() {
            match rule.action {
                Action::Model => assert_ne!(rule.context, Context::Ignored, "{ctx} {tag}"),
                _ => assert_eq!(rule.context, Context::Ignored, "{ctx} {tag}"),
            }
        }
    }

    #[test]
    fn labels_fall_back_to_tag() {
        assert_eq!(label_for("ALIA"), "Alias");
        assert_eq!(label_for("_ZZZ"), "_ZZZ");
    }
}
