//! Tag-stack automaton
//!
//! Consumes the open/close/text event stream and builds the record graph.
//! Each open tag becomes a [`Frame`] whose [`Context`] comes from the rule
//! table; modeled frames may carry a [`Builder`] for the entity they are
//! assembling, and every frame carries a bucket of captured text from
//! ignored subtrees below it.
//!
//! Ignore mode is entered when a rule says to skip a subtree. While it is
//! active every open pushes an `Ignored` frame without consulting the rules,
//! and only the close that brings the stack back to the entry depth leaves
//! it. Capturing ignores fold their text into `Label: text` lines that bubble
//! up to the nearest entity, which keeps them in `refs.ignored`.

use lineage_model::{
    normalize_key, Child, Citation, Event, EventAttribute, EventContainer, EventKind, Family,
    Gender, Image, ImageLink, Insert, Name, Note, Person, RecordGraph, ReferenceContainer,
    Repository, RepositoryRef, Source,
};

use crate::config::ParserConfig;
use crate::error::{ParseError, Result};
use crate::event::TagEvent;
use crate::report::ParseReport;
use crate::rules::{label_for, Action, Context, RuleTable, STANDARD_RULES};
use crate::schema::{CustomTagSchema, SchemaScope};

// ============================================================================
// Frames and builders
// ============================================================================

/// Entity under construction on a frame.
#[derive(Debug)]
enum Builder {
    Person(Person),
    Family(Family),
    Source(Source),
    Repository(Repository),
    Note(Note),
    Image(Image),
    Name(Name),
    Event(Event),
    Citation(Citation),
    FamilyLink { pedigree: Option<String> },
    Spouse { preferred: bool },
    Child(Child),
    RepositoryLink(RepositoryRef),
    SchemaTag { scope: SchemaScope, label: Option<String> },
}

impl Builder {
    fn references_mut(&mut self) -> Option<&mut dyn ReferenceContainer> {
        match self {
            Builder::Person(p) => Some(p),
            Builder::Family(f) => Some(f),
            Builder::Source(s) => Some(s),
            Builder::Repository(r) => Some(r),
            Builder::Note(n) => Some(n),
            Builder::Image(i) => Some(i),
            Builder::Name(n) => Some(n),
            Builder::Event(e) => Some(e),
            Builder::Citation(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Frame {
    tag: String,
    id: Option<String>,
    line: usize,
    context: Context,
    text: String,
    ignored: Vec<String>,
    builder: Option<Builder>,
}

impl Frame {
    fn new(tag: String, id: Option<String>, line: usize, context: Context) -> Self {
        Self {
            tag,
            id,
            line,
            context,
            text: String::new(),
            ignored: Vec::new(),
            builder: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct IgnoreMode {
    /// Stack index of the frame that started the ignore.
    depth: usize,
    capture: bool,
}

fn nearest_builder(stack: &mut [Frame]) -> Option<&mut Builder> {
    stack.iter_mut().rev().find_map(|f| f.builder.as_mut())
}

fn nearest_container(stack: &mut [Frame]) -> Option<&mut dyn ReferenceContainer> {
    stack
        .iter_mut()
        .rev()
        .find_map(|f| f.builder.as_mut().and_then(Builder::references_mut))
}

fn pointer(text: &str) -> Option<String> {
    let t = text.trim();
    if t.len() > 2 && t.starts_with('@') && t.ends_with('@') {
        normalize_key(t)
    } else {
        None
    }
}

/// `Label: text` lines for a captured frame, followed by whatever its own
/// children captured.
fn captured_lines(tag: &str, text: &str, nested: Vec<String>) -> Vec<String> {
    let label = label_for(tag);
    let text = text.trim();
    if text.is_empty() {
        if nested.is_empty() {
            return nested;
        }
        return vec![format!("{label}: {}", nested.join("; "))];
    }
    let mut lines = Vec::with_capacity(nested.len() + 1);
    lines.push(format!("{label}: {text}"));
    lines.extend(nested);
    lines
}

fn replace_value(slot: &mut Option<String>, value: &str) -> bool {
    if !value.is_empty() {
        *slot = Some(value.to_string());
    }
    true
}

fn first_value(slot: &mut Option<String>, value: &str) -> bool {
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value.to_string());
    }
    true
}

fn append_value(slot: &mut Option<String>, value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    match slot {
        Some(existing) => {
            existing.push('\n');
            existing.push_str(value);
        }
        None => *slot = Some(value.to_string()),
    }
    true
}

fn overlay_name(text: &str, explicit: Name) -> Name {
    let mut name = Name::parse(text);
    let Name {
        given,
        surname,
        prefix,
        suffix,
        nickname,
        surname_prefix,
        name_type,
        refs,
    } = explicit;
    name.given = given.or(name.given);
    name.surname = surname.or(name.surname);
    name.prefix = prefix.or(name.prefix);
    name.suffix = suffix.or(name.suffix);
    name.nickname = nickname.or(name.nickname);
    name.surname_prefix = surname_prefix.or(name.surname_prefix);
    name.name_type = name_type.or(name.name_type);
    name.refs = refs;
    name
}

// ============================================================================
// Automaton
// ============================================================================

/// Result of a successful parse: the graph plus its diagnostics.
#[derive(Debug, Default)]
pub struct ParsedFile {
    pub graph: RecordGraph,
    pub report: ParseReport,
}

pub struct TagStackAutomaton<'c> {
    config: &'c ParserConfig,
    rules: &'c RuleTable,
    stack: Vec<Frame>,
    ignore: Option<IgnoreMode>,
    schema: CustomTagSchema,
    graph: RecordGraph,
    report: ParseReport,
}

impl<'c> TagStackAutomaton<'c> {
    pub fn new(config: &'c ParserConfig) -> Self {
        Self::with_rules(config, &STANDARD_RULES)
    }

    pub fn with_rules(config: &'c ParserConfig, rules: &'c RuleTable) -> Self {
        Self {
            config,
            rules,
            stack: Vec::new(),
            ignore: None,
            schema: CustomTagSchema::default(),
            graph: RecordGraph::new(),
            report: ParseReport::default(),
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_ignoring(&self) -> bool {
        self.ignore.is_some()
    }

    pub fn report(&self) -> &ParseReport {
        &self.report
    }

    pub fn report_mut(&mut self) -> &mut ParseReport {
        &mut self.report
    }

    pub fn feed(&mut self, event: TagEvent) -> Result<()> {
        match event {
            TagEvent::Open { name, id, line } => {
                self.open(&name, id, line);
                Ok(())
            }
            TagEvent::Close { name } => self.close(&name),
            TagEvent::Text { chars } => {
                self.text(&chars);
                Ok(())
            }
        }
    }

    pub fn finish(mut self) -> Result<ParsedFile> {
        if !self.stack.is_empty() {
            return Err(ParseError::UnclosedTags {
                open: self.stack.len(),
                warnings: self.report.warnings,
            });
        }
        self.report.custom_tags = self.schema.len();
        Ok(ParsedFile {
            graph: self.graph,
            report: self.report,
        })
    }

    /// Context of the innermost frame that is not a continuation line.
    fn effective_context(&self) -> Context {
        self.stack
            .iter()
            .rev()
            .map(|f| f.context)
            .find(|c| *c != Context::Continuation)
            .unwrap_or(Context::Root)
    }

    fn effective_parent_tag(&self) -> Option<&str> {
        self.stack
            .iter()
            .rev()
            .find(|f| f.context != Context::Continuation)
            .map(|f| f.tag.as_str())
    }

    // ------------------------------------------------------------------------
    // Open
    // ------------------------------------------------------------------------

    fn open(&mut self, name: &str, id: Option<String>, line: usize) {
        let tag = self.config.synonyms.canonical(name);

        if self.ignore.is_some() {
            self.stack.push(Frame::new(tag, id, line, Context::Ignored));
            return;
        }

        let parent = self.effective_context();
        let mut rule = self.rules.resolve(parent, &tag);
        let custom_scope = match parent {
            Context::Person => Some(SchemaScope::Person),
            Context::Family => Some(SchemaScope::Family),
            _ => None,
        };
        // A file's own schema declaration outranks the built-in row.
        let custom_label = custom_scope
            .and_then(|scope| self.schema.label(scope, &tag))
            .map(str::to_string);
        if custom_label.is_some() {
            rule.action = Action::Model;
            rule.context = if parent == Context::Family {
                Context::FamilyEvent
            } else {
                Context::PersonEvent
            };
        }

        match rule.action {
            Action::Model => {
                let mut frame = Frame::new(tag, id, line, rule.context);
                frame.builder = self.start_builder(&frame, custom_label);
                self.stack.push(frame);
            }
            Action::SilentIgnore | Action::CaptureIgnore | Action::Unknown => {
                if rule.action == Action::Unknown {
                    self.unknown_tag(&tag, line);
                }
                self.ignore = Some(IgnoreMode {
                    depth: self.stack.len(),
                    capture: rule.action != Action::SilentIgnore,
                });
                self.stack.push(Frame::new(tag, id, line, Context::Ignored));
            }
        }
    }

    fn unknown_tag(&mut self, tag: &str, line: usize) {
        self.report.had_unknown_tag = true;
        self.report.unknown_tags += 1;
        let under = self.effective_parent_tag().unwrap_or("(top level)").to_string();
        let message = format!("unrecognized tag {tag} under {under}");
        if self.config.unknown_tags_as_warnings {
            self.report.warn(Some(line), Some(tag), message);
        } else {
            self.report.info(Some(line), Some(tag), message);
        }
    }

    fn start_builder(&self, frame: &Frame, custom_label: Option<String>) -> Option<Builder> {
        let key = || {
            frame
                .id
                .as_deref()
                .and_then(normalize_key)
                .unwrap_or_default()
        };
        let builder = match frame.context {
            Context::Person => Builder::Person(Person::new(key())),
            Context::Family => Builder::Family(Family::new(key())),
            Context::Source => Builder::Source(Source::new(key())),
            Context::Repository => Builder::Repository(Repository::new(key())),
            Context::NoteRecord => Builder::Note(Note {
                key: key(),
                ..Note::default()
            }),
            Context::ImageRecord => Builder::Image(Image {
                key: key(),
                ..Image::default()
            }),
            Context::Image => Builder::Image(Image::default()),
            Context::Name => Builder::Name(Name::default()),
            Context::PersonEvent | Context::FamilyEvent => {
                let family = frame.context == Context::FamilyEvent;
                let kind = if custom_label.is_some() {
                    EventKind::Other
                } else {
                    EventKind::from_tag(&frame.tag, family).unwrap_or(EventKind::Other)
                };
                let mut event = Event::new(kind);
                if let Some(label) = custom_label {
                    event.set_description(&label);
                }
                Builder::Event(event)
            }
            Context::SourceEvent => Builder::Event(Event::new(EventKind::Other)),
            Context::Citation => Builder::Citation(Citation::default()),
            Context::FamilyLink => Builder::FamilyLink { pedigree: None },
            Context::SpouseLink => Builder::Spouse { preferred: false },
            Context::ChildLink => Builder::Child(Child::new("")),
            Context::RepositoryLink => Builder::RepositoryLink(RepositoryRef::default()),
            Context::SchemaTag => {
                let scope = self
                    .stack
                    .last()
                    .and_then(|f| SchemaScope::from_record_tag(&f.tag))?;
                Builder::SchemaTag { scope, label: None }
            }
            _ => return None,
        };
        Some(builder)
    }

    // ------------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------------

    fn text(&mut self, chars: &str) {
        let Some(top) = self.stack.last_mut() else {
            self.report.warn(None, None, "text outside any tag dropped");
            return;
        };
        if top.context.accepts_text() {
            top.text.push_str(chars);
            return;
        }
        let (line, tag) = (top.line, top.tag.clone());
        self.report.warn(
            Some(line),
            Some(&tag),
            format!("unexpected value on {tag} dropped: {}", chars.trim()),
        );
    }

    // ------------------------------------------------------------------------
    // Close
    // ------------------------------------------------------------------------

    fn close(&mut self, name: &str) -> Result<()> {
        let tag = self.config.synonyms.canonical(name);
        let Some(frame) = self.stack.pop() else {
            return Err(ParseError::UnbalancedClose {
                expected: None,
                found: tag,
                warnings: self.report.warnings,
            });
        };
        if frame.tag != tag {
            return Err(ParseError::UnbalancedClose {
                expected: Some(frame.tag),
                found: tag,
                warnings: self.report.warnings,
            });
        }

        if let Some(mode) = self.ignore {
            if self.stack.len() == mode.depth {
                self.ignore = None;
                if mode.capture {
                    let lines = captured_lines(&frame.tag, &frame.text, frame.ignored);
                    self.forward_ignored(lines);
                }
            } else if mode.capture {
                self.fold_ignored_child(frame);
            }
            return Ok(());
        }

        self.attach(frame)
    }

    /// A nested frame inside a capturing ignore closes into its parent, which
    /// is itself an ignored frame.
    fn fold_ignored_child(&mut self, frame: Frame) {
        let Some(parent) = self.stack.last_mut() else {
            return;
        };
        match frame.tag.as_str() {
            "CONT" => {
                parent.text.push('\n');
                parent.text.push_str(&frame.text);
                parent.ignored.extend(frame.ignored);
            }
            "CONC" => {
                parent.text.push_str(&frame.text);
                parent.ignored.extend(frame.ignored);
            }
            _ => parent
                .ignored
                .extend(captured_lines(&frame.tag, &frame.text, frame.ignored)),
        }
    }

    /// Hands captured lines to the new top frame.
    fn forward_ignored(&mut self, lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        match self.stack.last_mut() {
            Some(top) => top.ignored.extend(lines),
            None => {
                self.report.orphaned_text += lines.len();
                tracing::debug!(lines = lines.len(), "captured text at top level dropped");
            }
        }
    }

    fn attach(&mut self, frame: Frame) -> Result<()> {
        let Frame {
            tag,
            id,
            line,
            context,
            text,
            ignored,
            builder,
        } = frame;

        if context.is_record() {
            return self.finish_record(&tag, id, line, text, ignored, builder);
        }

        match (context, builder) {
            (Context::Continuation, _) => {
                if let Some(parent) = self.stack.last_mut() {
                    if tag == "CONT" {
                        parent.text.push('\n');
                    }
                    parent.text.push_str(&text);
                    parent.ignored.extend(ignored);
                }
            }
            (Context::Value, _) => {
                self.forward_ignored(ignored);
                self.attach_value(&tag, &text, line);
            }
            (Context::Place, _) => {
                self.forward_ignored(ignored);
                if let Some(Builder::Event(event)) = nearest_builder(&mut self.stack) {
                    event.set_attribute(EventAttribute::Place, &text);
                }
            }
            (Context::Address, _) => {
                self.forward_ignored(ignored);
                if let Some(Builder::Repository(repo)) = nearest_builder(&mut self.stack) {
                    repo.set_field("ADDR", &text);
                }
            }
            (Context::Note, _) => {
                self.forward_ignored(ignored);
                if let Some(owner) = nearest_container(&mut self.stack) {
                    match pointer(&text) {
                        Some(key) => owner.add_note_ref(&key),
                        None => owner.add_note(&text),
                    }
                }
            }
            (Context::Citation, Some(Builder::Citation(mut citation))) => {
                match pointer(&text) {
                    Some(key) => citation.source_key = Some(key),
                    None => {
                        let title = text.trim();
                        if !title.is_empty() {
                            citation.title = Some(title.to_string());
                        }
                    }
                }
                citation.refs.ignored.extend(ignored);
                if citation.source_key.is_none() && citation.title.is_none() {
                    self.report
                        .warn(Some(line), Some(&tag), "citation with neither source nor text dropped");
                } else if let Some(owner) = nearest_container(&mut self.stack) {
                    owner.add_citation(citation);
                }
            }
            (Context::Image, Some(Builder::Image(image))) => {
                self.forward_ignored(ignored);
                let link = match (pointer(&text), image.file) {
                    (Some(key), _) => Some(ImageLink::Key { key }),
                    (None, Some(path)) => Some(ImageLink::File {
                        path,
                        title: image.title,
                        format: image.format,
                    }),
                    (None, None) => None,
                };
                match link {
                    Some(link) => {
                        if let Some(owner) = nearest_container(&mut self.stack) {
                            owner.add_image(link);
                        }
                    }
                    None => self
                        .report
                        .warn(Some(line), Some(&tag), "image with no file or record dropped"),
                }
            }
            (Context::ImageFile, _) => {
                self.forward_ignored(ignored);
                let path = text.trim();
                if let Some(Builder::Image(image)) = nearest_builder(&mut self.stack) {
                    if image.file.is_none() && !path.is_empty() {
                        image.file = Some(path.to_string());
                    }
                }
            }
            (Context::Name, Some(Builder::Name(explicit))) => {
                let mut name = overlay_name(&text, explicit);
                name.refs.ignored.extend(ignored);
                if let Some(Builder::Person(person)) = nearest_builder(&mut self.stack) {
                    person.add_name(name);
                }
            }
            (
                Context::PersonEvent | Context::FamilyEvent | Context::SourceEvent,
                Some(Builder::Event(mut event)),
            ) => {
                let text = text.trim();
                if context == Context::SourceEvent {
                    event.set_description(text);
                } else if !text.eq_ignore_ascii_case("Y") {
                    event.append_content(text);
                }
                event.references_mut().ignored.extend(ignored);
                match nearest_builder(&mut self.stack) {
                    Some(Builder::Person(p)) => p.add_event(event),
                    Some(Builder::Family(f)) => f.add_event(event),
                    Some(Builder::Source(s)) => s.add_event(event),
                    _ => {}
                }
            }
            (Context::FamilyLink, Some(Builder::FamilyLink { pedigree })) => {
                self.forward_ignored(ignored);
                let Some(key) = normalize_key(&text) else {
                    self.report
                        .warn(Some(line), Some(&tag), format!("{tag} without a family pointer"));
                    return Ok(());
                };
                if let Some(Builder::Person(person)) = nearest_builder(&mut self.stack) {
                    if tag == "FAMC" {
                        person.add_child_of(&key);
                        if let Some(p) = pedigree {
                            person.set_pedigree(&key, &p);
                        }
                    } else {
                        person.add_spouse_of(&key);
                    }
                }
            }
            (Context::SpouseLink, Some(Builder::Spouse { preferred })) => {
                self.forward_ignored(ignored);
                let Some(key) = normalize_key(&text) else {
                    self.report
                        .warn(Some(line), Some(&tag), format!("{tag} without a person pointer"));
                    return Ok(());
                };
                if let Some(Builder::Family(family)) = nearest_builder(&mut self.stack) {
                    if tag == "HUSB" {
                        family.add_husband(&key, preferred);
                    } else {
                        family.add_wife(&key, preferred);
                    }
                }
            }
            (Context::ChildLink, Some(Builder::Child(mut child))) => {
                self.forward_ignored(ignored);
                let Some(key) = normalize_key(&text) else {
                    self.report
                        .warn(Some(line), Some(&tag), "CHIL without a person pointer");
                    return Ok(());
                };
                child.key = key;
                if let Some(Builder::Family(family)) = nearest_builder(&mut self.stack) {
                    family.add_child(child);
                }
            }
            (Context::RepositoryLink, Some(Builder::RepositoryLink(mut link))) => {
                self.forward_ignored(ignored);
                match pointer(&text) {
                    Some(key) => link.key = Some(key),
                    None => {
                        let name = text.trim();
                        if link.name.is_none() && !name.is_empty() {
                            link.name = Some(name.to_string());
                        }
                    }
                }
                if let Some(Builder::Source(source)) = nearest_builder(&mut self.stack) {
                    source.repositories.push(link);
                }
            }
            (Context::SchemaTag, Some(Builder::SchemaTag { scope, label })) => {
                self.schema
                    .declare(scope, &tag, label.as_deref().unwrap_or(""));
                tracing::debug!(tag = %tag, scope = ?scope, "custom event tag declared");
            }
            (Context::HeaderSource, _) => {
                let program = text.trim();
                if self.report.source_program.is_none() && !program.is_empty() {
                    self.report.source_program = Some(program.to_string());
                }
            }
            _ => self.forward_ignored(ignored),
        }
        Ok(())
    }

    /// A `Value` frame closes into whatever its parent is building.
    fn attach_value(&mut self, tag: &str, text: &str, line: usize) {
        let parent = self.effective_context();
        let value = text.trim();

        match parent {
            Context::HeaderSource if tag == "NAME" => {
                if !value.is_empty() {
                    self.report.source_program = Some(value.to_string());
                }
                return;
            }
            Context::Address => {
                if let Some(addr) = self.stack.last_mut() {
                    if !addr.text.is_empty() && !value.is_empty() {
                        addr.text.push('\n');
                    }
                    addr.text.push_str(value);
                }
                return;
            }
            _ => {}
        }

        let config = self.config;
        let handled = match nearest_builder(&mut self.stack) {
            Some(Builder::Person(person)) if tag == "SEX" => {
                person.set_gender(Gender::from_sex(value));
                true
            }
            Some(Builder::Name(name)) => name.set_part(tag, value),
            Some(Builder::Event(event)) => match tag {
                "DATE" => {
                    event.set_date(config.dates.interpret(value));
                    true
                }
                "TYPE" => {
                    event.set_description(value);
                    true
                }
                "TEMP" => {
                    event.set_attribute(EventAttribute::Temple, config.temples.name_or_code(value));
                    true
                }
                _ => EventAttribute::from_tag(tag)
                    .map(|attr| event.set_attribute(attr, value))
                    .is_some(),
            },
            Some(Builder::Source(source)) => source.set_field(tag, value),
            Some(Builder::Repository(repo)) => repo.set_field(tag, value),
            Some(Builder::RepositoryLink(link)) => match tag {
                "CALN" => replace_value(&mut link.call_number, value),
                "NAME" => replace_value(&mut link.name, value),
                "MEDI" => replace_value(&mut link.media, value),
                _ => false,
            },
            Some(Builder::Citation(citation)) => match tag {
                "PAGE" => append_value(&mut citation.page, value),
                "QUAY" => append_value(&mut citation.quality, value),
                "DATE" => append_value(&mut citation.date, value),
                "TEXT" => append_value(&mut citation.text, value),
                _ => false,
            },
            Some(Builder::Image(image)) => match tag {
                "FORM" => first_value(&mut image.format, value),
                "TITL" => first_value(&mut image.title, value),
                _ => false,
            },
            Some(Builder::FamilyLink { pedigree }) => {
                if tag == "PEDI" {
                    replace_value(pedigree, value)
                } else {
                    first_value(pedigree, value)
                }
            }
            Some(Builder::Spouse { preferred }) => {
                *preferred = value.to_ascii_uppercase().starts_with('Y');
                true
            }
            Some(Builder::Child(child)) => match tag {
                "_STAT" | "STAT" => replace_value(&mut child.status, value),
                _ => {
                    child.adopted |= value.eq_ignore_ascii_case("adopted");
                    true
                }
            },
            Some(Builder::SchemaTag { label, .. }) => replace_value(label, value),
            _ => false,
        };
        if !handled {
            tracing::debug!(tag, line, "value kept as captured text");
            self.forward_ignored(captured_lines(tag, value, Vec::new()));
        }
    }

    // ------------------------------------------------------------------------
    // Top-level records
    // ------------------------------------------------------------------------

    fn finish_record(
        &mut self,
        tag: &str,
        id: Option<String>,
        line: usize,
        text: String,
        ignored: Vec<String>,
        builder: Option<Builder>,
    ) -> Result<()> {
        let key = id.as_deref().and_then(normalize_key);
        let Some(key) = key else {
            if matches!(tag, "FAM" | "SOUR") {
                return Err(ParseError::MissingIdentifier {
                    tag: tag.to_string(),
                    line,
                    warnings: self.report.warnings,
                });
            }
            self.report.dropped_records += 1;
            self.report
                .warn(Some(line), Some(tag), format!("{tag} record without identifier dropped"));
            return Ok(());
        };

        let outcome = match builder {
            Some(Builder::Person(mut person)) => {
                person.references_mut().ignored.extend(ignored);
                self.graph.insert_person(person)
            }
            Some(Builder::Family(mut family)) => {
                family.references_mut().ignored.extend(ignored);
                self.graph.insert_family(family)
            }
            Some(Builder::Source(mut source)) => {
                source.refs.ignored.extend(ignored);
                self.graph.insert_source(source)
            }
            Some(Builder::Repository(mut repo)) => {
                repo.refs.ignored.extend(ignored);
                self.graph.insert_repository(repo)
            }
            Some(Builder::Note(mut note)) => {
                note.text = text.trim_end().to_string();
                note.refs.ignored.extend(ignored);
                self.graph.insert_note(note)
            }
            Some(Builder::Image(mut image)) => {
                image.refs.ignored.extend(ignored);
                self.graph.insert_image(image)
            }
            _ => return Ok(()),
        };

        match outcome {
            Insert::Inserted => {}
            Insert::Merged => {
                self.report.merged_records += 1;
                self.report.info(
                    Some(line),
                    Some(tag),
                    format!("second {tag} record {key} merged into the first"),
                );
            }
            Insert::Duplicate => {
                self.report.dropped_records += 1;
                self.report.warn(
                    Some(line),
                    Some(tag),
                    format!("duplicate {tag} record {key} dropped"),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(events: Vec<TagEvent>) -> ParsedFile {
        let config = ParserConfig::default();
        let mut a = TagStackAutomaton::new(&config);
        for e in events {
            a.feed(e).expect("balanced stream");
        }
        a.finish().expect("should finish")
    }

    #[test]
    fn builds_person_from_events() {
        let parsed = run(vec![
            TagEvent::open_record("INDI", "@I1@"),
            TagEvent::open("NAME"),
            TagEvent::text("Ann /Lee/"),
            TagEvent::close("NAME"),
            TagEvent::open("SEX"),
            TagEvent::text("F"),
            TagEvent::close("SEX"),
            TagEvent::close("INDI"),
        ]);
        let p = parsed.graph.person("I1").expect("person");
        assert_eq!(p.gender(), Gender::Female);
        assert_eq!(p.name().and_then(|n| n.surname.as_deref()), Some("Lee"));
    }

    #[test]
    fn ignore_mode_spans_nested_tags() {
        let config = ParserConfig::default();
        let mut a = TagStackAutomaton::new(&config);
        a.feed(TagEvent::open_record("INDI", "@I1@")).unwrap();
        a.feed(TagEvent::open("ASSO")).unwrap();
        assert!(a.is_ignoring());
        a.feed(TagEvent::text("@I2@")).unwrap();
        a.feed(TagEvent::open("RELA")).unwrap();
        a.feed(TagEvent::text("Godfather")).unwrap();
        a.feed(TagEvent::close("RELA")).unwrap();
        assert!(a.is_ignoring());
        a.feed(TagEvent::close("ASSO")).unwrap();
        assert!(!a.is_ignoring());
        a.feed(TagEvent::close("INDI")).unwrap();
        let parsed = a.finish().unwrap();
        let p = parsed.graph.person("I1").unwrap();
        assert_eq!(
            p.references().ignored,
            vec!["Associate: @I2@".to_string(), "Relationship: Godfather".to_string()]
        );
    }

    #[test]
    fn mismatched_close_is_fatal() {
        let config = ParserConfig::default();
        let mut a = TagStackAutomaton::new(&config);
        a.feed(TagEvent::open_record("INDI", "@I1@")).unwrap();
        let err = a.feed(TagEvent::close("FAM")).unwrap_err();
        assert!(matches!(err, ParseError::UnbalancedClose { .. }));
    }

    #[test]
    fn unclosed_stack_is_fatal() {
        let config = ParserConfig::default();
        let mut a = TagStackAutomaton::new(&config);
        a.feed(TagEvent::open_record("INDI", "@I1@")).unwrap();
        assert!(matches!(
            a.finish(),
            Err(ParseError::UnclosedTags { open: 1, .. })
        ));
    }

    #[test]
    fn schema_label_overrides_builtin_event_row() {
        let mut events = vec![TagEvent::open("HEAD"), TagEvent::open("SCHEMA"), TagEvent::open("INDI")];
        events.extend([
            TagEvent::open("_MILT"),
            TagEvent::open("LABL"),
            TagEvent::text("Military service"),
            TagEvent::close("LABL"),
            TagEvent::close("_MILT"),
            TagEvent::close("INDI"),
            TagEvent::close("SCHEMA"),
            TagEvent::close("HEAD"),
            TagEvent::open_record("INDI", "@I1@"),
            TagEvent::open("_MILT"),
            TagEvent::text("Dragoons"),
            TagEvent::close("_MILT"),
            TagEvent::close("INDI"),
        ]);
        let parsed = run(events);
        let p = parsed.graph.person("I1").expect("person");
        assert!(p.first_event(EventKind::MilitaryService).is_none());
        let e = p.first_event(EventKind::Other).expect("declared event");
        assert_eq!(e.description(), Some("Military service"));
        assert_eq!(e.content(), Some("Dragoons"));
        assert!(!parsed.report.had_unknown_tag);
    }

    #[test]
    fn captured_lines_fold_children_without_text() {
        let lines = captured_lines("ADDR", "", vec!["City: Ely".into(), "Country: UK".into()]);
        assert_eq!(lines, vec!["Address: City: Ely; Country: UK".to_string()]);
        assert!(captured_lines("ADDR", " ", Vec::new()).is_empty());
    }
}
