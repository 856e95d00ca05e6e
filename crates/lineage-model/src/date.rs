//! Fuzzy (range-valued) dates and the date-interpretation seam.
//!
//! Genealogical dates are rarely exact: `ABT 1850`, `BEF MAR 1790`,
//! `BET 1801 AND 1805`. Everything downstream of the parser only needs a
//! narrow view of a date:
//!
//! - `min_day` / `max_day`: the earliest/latest possible day number
//!   (days from the common era, as produced by `chrono`)
//! - `sort_key`: one best-effort integer used for ordering
//! - `formatted_date`: a normalized display form
//! - `is_valid`: whether the text was understood at all
//!
//! The [`DateInterpreter`] trait is that seam. [`GedcomDateInterpreter`] is a
//! built-in implementation covering the GEDCOM 5.5 date grammar most desktop
//! programs actually emit.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Years added on each side of an approximate (`ABT`, `EST`, `CAL`) date.
pub const APPROXIMATE_DATE_SLACK_YEARS: i32 = 5;

// ============================================================================
// FuzzyDate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FuzzyDate {
    original: String,
    min_day: Option<i32>,
    max_day: Option<i32>,
    sort_key: Option<i64>,
    formatted: String,
    valid: bool,
}

impl FuzzyDate {
    pub fn new(
        original: impl Into<String>,
        min_day: Option<i32>,
        max_day: Option<i32>,
        sort_key: Option<i64>,
        formatted: impl Into<String>,
    ) -> Self {
        Self {
            original: original.into(),
            min_day,
            max_day,
            sort_key,
            formatted: formatted.into(),
            valid: true,
        }
    }

    /// A date whose text could not be interpreted. The original text is kept
    /// verbatim as the formatted form.
    pub fn invalid(original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            formatted: original.clone(),
            original,
            min_day: None,
            max_day: None,
            sort_key: None,
            valid: false,
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn min_day(&self) -> Option<i32> {
        self.min_day
    }

    pub fn max_day(&self) -> Option<i32> {
        self.max_day
    }

    pub fn sort_key(&self) -> Option<i64> {
        self.sort_key
    }

    pub fn formatted_date(&self) -> &str {
        &self.formatted
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Year of the latest possible day, if bounded above.
    pub fn max_year(&self) -> Option<i32> {
        self.max_day.map(year_of_day)
    }

    /// Year of the earliest possible day, if bounded below.
    pub fn min_year(&self) -> Option<i32> {
        self.min_day.map(year_of_day)
    }
}

/// Narrow query interface to a free-text date library.
pub trait DateInterpreter: Send + Sync {
    fn interpret(&self, text: &str) -> FuzzyDate;
}

/// First day (Jan 1) of `year` as a day number.
pub fn first_day_of_year(year: i32) -> i32 {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .map(|d| d.num_days_from_ce())
        .unwrap_or(if year > 0 { i32::MAX } else { i32::MIN })
}

/// Calendar year containing the given day number.
pub fn year_of_day(day: i32) -> i32 {
    NaiveDate::from_num_days_from_ce_opt(day)
        .map(|d| d.year())
        .unwrap_or(if day > 0 { i32::MAX } else { i32::MIN })
}

// ============================================================================
// GEDCOM date grammar
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("empty date")]
    Empty,
    #[error("unrecognized date text `{0}`")]
    Unrecognized(String),
    #[error("day {day} out of range for {month}/{year}")]
    DayOutOfRange { year: i32, month: u32, day: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    Exact,
    About,
    Before,
    After,
    Between,
}

impl Modifier {
    fn sort_offset(self) -> i64 {
        match self {
            Modifier::Before => 1,
            Modifier::About => 4,
            Modifier::Exact | Modifier::Between => 5,
            Modifier::After => 8,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Modifier::Exact => "",
            Modifier::About => "Abt ",
            Modifier::Before => "Bef ",
            Modifier::After => "Aft ",
            Modifier::Between => "Bet ",
        }
    }
}

/// One calendar point with optional month/day precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SimpleDate {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

impl SimpleDate {
    fn first_day(&self) -> i32 {
        let month = self.month.unwrap_or(1);
        let day = self.day.unwrap_or(1);
        NaiveDate::from_ymd_opt(self.year, month, day)
            .map(|d| d.num_days_from_ce())
            .unwrap_or_else(|| first_day_of_year(self.year))
    }

    fn last_day(&self) -> i32 {
        match (self.month, self.day) {
            (Some(m), Some(d)) => NaiveDate::from_ymd_opt(self.year, m, d)
                .map(|d| d.num_days_from_ce())
                .unwrap_or_else(|| first_day_of_year(self.year + 1) - 1),
            (Some(m), None) => {
                let (ny, nm) = if m == 12 { (self.year + 1, 1) } else { (self.year, m + 1) };
                NaiveDate::from_ymd_opt(ny, nm, 1)
                    .map(|d| d.num_days_from_ce() - 1)
                    .unwrap_or_else(|| first_day_of_year(self.year + 1) - 1)
            }
            _ => first_day_of_year(self.year + 1) - 1,
        }
    }

    fn key(&self) -> i64 {
        i64::from(self.year) * 10_000
            + i64::from(self.month.unwrap_or(0)) * 100
            + i64::from(self.day.unwrap_or(0))
    }

    fn format(&self) -> String {
        let mut out = String::new();
        if let Some(d) = self.day {
            out.push_str(&format!("{d} "));
        }
        if let Some(m) = self.month {
            out.push_str(MONTH_LABELS[(m - 1) as usize]);
            out.push(' ');
        }
        if self.year <= 0 {
            out.push_str(&format!("{} BC", 1 - self.year));
        } else {
            out.push_str(&self.year.to_string());
        }
        out
    }
}

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_number(token: &str) -> Option<u32> {
    let t = token.trim_end_matches('.');
    let prefix: String = t.chars().take(3).collect();
    let n = match prefix.as_str() {
        "JAN" => 1,
        "FEB" => 2,
        "MAR" => 3,
        "APR" => 4,
        "MAY" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AUG" => 8,
        "SEP" => 9,
        "OCT" => 10,
        "NOV" => 11,
        "DEC" => 12,
        _ => return None,
    };
    // Full names must actually be the month ("MARCH" ok, "MARK" not).
    let full = [
        "JANUARY", "FEBRUARY", "MARCH", "APRIL", "MAY", "JUNE", "JULY", "AUGUST", "SEPTEMBER",
        "OCTOBER", "NOVEMBER", "DECEMBER",
    ][(n - 1) as usize];
    full.starts_with(t).then_some(n)
}

static DUAL_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,4})/(\d{1,2})$").expect("dual-year regex"));

fn parse_year(token: &str) -> Option<i32> {
    if let Some(caps) = DUAL_YEAR.captures(token) {
        // `1750/51`: the later (new-style) year wins.
        let first: i32 = caps[1].parse().ok()?;
        let tail: i32 = caps[2].parse().ok()?;
        let modulus = if caps[2].len() == 1 { 10 } else { 100 };
        let mut year = first - first % modulus + tail;
        if year < first {
            year += modulus;
        }
        return Some(year);
    }
    if token.len() <= 4 && token.chars().all(|c| c.is_ascii_digit()) {
        return token.parse().ok();
    }
    None
}

fn parse_simple(text: &str) -> Result<SimpleDate, DateError> {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(DateError::Empty);
    }

    let mut bc = false;
    if let Some(last) = tokens.last() {
        if matches!(*last, "BC" | "B.C." | "BCE") {
            bc = true;
            tokens.pop();
        }
    }

    let unrecognized = || DateError::Unrecognized(text.to_string());
    let (day, month, year_token) = match tokens.as_slice() {
        [y] => (None, None, *y),
        [m, y] => (None, Some(month_number(m).ok_or_else(unrecognized)?), *y),
        [d, m, y] => {
            let day: u32 = d.parse().map_err(|_| unrecognized())?;
            (Some(day), Some(month_number(m).ok_or_else(unrecognized)?), *y)
        }
        _ => return Err(unrecognized()),
    };

    let mut year = parse_year(year_token).ok_or_else(unrecognized)?;
    if bc {
        year = 1 - year;
    }

    if let (Some(d), Some(m)) = (day, month) {
        if NaiveDate::from_ymd_opt(year, m, d).is_none() {
            return Err(DateError::DayOutOfRange {
                year,
                month: m,
                day: d,
            });
        }
    }

    Ok(SimpleDate { year, month, day })
}

/// Built-in interpreter for GEDCOM date phrases.
#[derive(Debug, Clone, Default)]
pub struct GedcomDateInterpreter;

impl GedcomDateInterpreter {
    pub fn new() -> Self {
        Self
    }

    fn try_interpret(&self, original: &str) -> Result<FuzzyDate, DateError> {
        let upper = original.trim().to_ascii_uppercase();
        if upper.is_empty() {
            return Err(DateError::Empty);
        }
        // Interpreted phrases `(text)` carry no machine-readable date.
        if upper.starts_with('(') {
            return Err(DateError::Unrecognized(original.to_string()));
        }

        if let Some(rest) = strip_any(&upper, &["BET ", "BETWEEN "]) {
            let (a, b) = rest
                .split_once(" AND ")
                .ok_or_else(|| DateError::Unrecognized(original.to_string()))?;
            let (a, b) = (parse_simple(a)?, parse_simple(b)?);
            return Ok(range(original, Modifier::Between, &a, Some(&b)));
        }
        if let Some(rest) = strip_any(&upper, &["FROM "]) {
            return match rest.split_once(" TO ") {
                Some((a, b)) => {
                    let (a, b) = (parse_simple(a)?, parse_simple(b)?);
                    Ok(range(original, Modifier::Between, &a, Some(&b)))
                }
                None => {
                    let a = parse_simple(rest)?;
                    Ok(range(original, Modifier::Exact, &a, None))
                }
            };
        }
        if let Some(rest) = strip_any(&upper, &["TO "]) {
            let a = parse_simple(rest)?;
            return Ok(range(original, Modifier::Exact, &a, None));
        }
        if let Some(rest) = strip_any(&upper, &["BEF ", "BEF. ", "BEFORE "]) {
            let a = parse_simple(rest)?;
            return Ok(FuzzyDate::new(
                original,
                None,
                Some(a.first_day() - 1),
                Some(a.key() * 10 + Modifier::Before.sort_offset()),
                format!("{}{}", Modifier::Before.label(), a.format()),
            ));
        }
        if let Some(rest) = strip_any(&upper, &["AFT ", "AFT. ", "AFTER "]) {
            let a = parse_simple(rest)?;
            return Ok(FuzzyDate::new(
                original,
                Some(a.last_day() + 1),
                None,
                Some(a.key() * 10 + Modifier::After.sort_offset()),
                format!("{}{}", Modifier::After.label(), a.format()),
            ));
        }
        if let Some(rest) = strip_any(
            &upper,
            &["ABT ", "ABT. ", "ABOUT ", "EST ", "EST. ", "CAL ", "CIRCA ", "C. ", "CA "],
        ) {
            let a = parse_simple(rest)?;
            let s = APPROXIMATE_DATE_SLACK_YEARS;
            return Ok(FuzzyDate::new(
                original,
                Some(first_day_of_year(a.year - s)),
                Some(first_day_of_year(a.year + s + 1) - 1),
                Some(a.key() * 10 + Modifier::About.sort_offset()),
                format!("{}{}", Modifier::About.label(), a.format()),
            ));
        }

        let a = parse_simple(&upper)?;
        Ok(range(original, Modifier::Exact, &a, None))
    }
}

impl DateInterpreter for GedcomDateInterpreter {
    fn interpret(&self, text: &str) -> FuzzyDate {
        match self.try_interpret(text) {
            Ok(date) => date,
            Err(_) => FuzzyDate::invalid(text.trim()),
        }
    }
}

fn strip_any<'a>(text: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes
        .iter()
        .find_map(|p| text.strip_prefix(p))
        .map(str::trim)
}

fn range(original: &str, modifier: Modifier, a: &SimpleDate, b: Option<&SimpleDate>) -> FuzzyDate {
    let end = b.unwrap_or(a);
    let formatted = match b {
        Some(b) => format!("{}{} and {}", modifier.label(), a.format(), b.format()),
        None => format!("{}{}", modifier.label(), a.format()),
    };
    FuzzyDate::new(
        original,
        Some(a.first_day()),
        Some(end.last_day()),
        Some(a.key() * 10 + modifier.sort_offset()),
        formatted,
    )
}
