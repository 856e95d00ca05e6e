//! GEDCOM line lexer
//!
//! Turns `LEVEL [@XREF@] TAG [VALUE]` lines into the open/close/text event
//! stream the automaton consumes. Level numbers become balanced opens and
//! closes; pointer values are passed through as text.

use nom::{
    bytes::complete::{take_while1, take_while},
    character::complete::{char, digit1, space0},
    combinator::{all_consuming, map_res, opt, rest},
    sequence::{delimited, preceded, terminated},
    IResult,
};

use crate::event::TagEvent;

// ============================================================================
// Line grammar
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GedcomLine<'a> {
    pub level: usize,
    pub xref: Option<&'a str>,
    pub tag: &'a str,
    pub value: Option<&'a str>,
}

fn level(input: &str) -> IResult<&str, usize> {
    preceded(space0, map_res(digit1, str::parse::<usize>))(input)
}

fn xref(input: &str) -> IResult<&str, &str> {
    terminated(
        delimited(char('@'), take_while1(|c: char| c != '@'), char('@')),
        char(' '),
    )(input)
}

fn tag_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

/// Parses one physical line. The value keeps everything after the single
/// delimiter, including leading and trailing spaces that `CONC` relies on.
pub fn gedcom_line(input: &str) -> IResult<&str, GedcomLine<'_>> {
    let (input, level) = level(input)?;
    let (input, _) = preceded(char(' '), take_while(|c: char| c == ' '))(input)?;
    let (input, xref) = opt(xref)(input)?;
    let (input, tag) = tag_name(input)?;
    let (input, value) = all_consuming(opt(preceded(char(' '), rest)))(input)?;
    Ok((
        input,
        GedcomLine {
            level,
            xref,
            tag,
            value: value.filter(|v| !v.is_empty()),
        },
    ))
}

// ============================================================================
// Event stream
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexWarning {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct LexOutput {
    pub events: Vec<TagEvent>,
    pub warnings: Vec<LexWarning>,
}

/// Physical lines under LF, CRLF or bare CR endings.
fn physical_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .flat_map(|l| l.strip_suffix('\r').unwrap_or(l).split('\r'))
}

/// Lexes a whole file into a balanced event stream.
///
/// Malformed lines are skipped with a warning. A level that jumps more than
/// one deeper than its parent is clamped to the next level.
pub fn tag_events(text: &str) -> LexOutput {
    let mut out = LexOutput::default();
    let mut open: Vec<String> = Vec::new();

    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    for (index, raw) in physical_lines(text).enumerate() {
        let line_no = index + 1;
        if raw.trim().is_empty() {
            continue;
        }
        let line = match gedcom_line(raw) {
            Ok((_, line)) => line,
            Err(_) => {
                out.warnings.push(LexWarning {
                    line: line_no,
                    message: format!("malformed line skipped: {}", raw.trim()),
                });
                continue;
            }
        };

        let mut level = line.level;
        if level > open.len() {
            out.warnings.push(LexWarning {
                line: line_no,
                message: format!(
                    "level {} under level {} clamped",
                    level,
                    open.len().saturating_sub(1)
                ),
            });
            level = open.len();
        }
        while open.len() > level {
            if let Some(name) = open.pop() {
                out.events.push(TagEvent::Close { name });
            }
        }

        let name = line.tag.to_ascii_uppercase();
        open.push(name.clone());
        out.events.push(TagEvent::Open {
            name,
            id: line.xref.map(str::to_string),
            line: line_no,
        });
        if let Some(value) = line.value {
            out.events.push(TagEvent::Text {
                chars: value.to_string(),
            });
        }
    }
    while let Some(name) = open.pop() {
        out.events.push(TagEvent::Close { name });
    }
    out
}
