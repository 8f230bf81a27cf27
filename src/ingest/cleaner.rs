//! Cell cleaning - raw sheet cells → typed record fields
//!
//! Every function here is total: a cell that cannot be interpreted cleans to
//! an empty string or `None`. Whether that is acceptable is decided by the
//! assembler, not here.

use std::sync::OnceLock;

use calamine::Data;
use chrono::{Datelike, Local, NaiveDate, Timelike};
use regex::Regex;

/// Markers people type into a cell to mean "nothing here"
const PLACEHOLDERS: [&str; 3] = ["-", "N/A", "NA"];

/// Render a cell as text, the way it reads in the sheet.
///
/// Whole-valued floats lose their `.0` so numeric lot numbers and serials
/// read naturally. Error cells render as empty.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if ndt.time().num_seconds_from_midnight() == 0 => {
                ndt.date().format("%Y-%m-%d").to_string()
            }
            Some(ndt) => ndt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// True for blank text and the placeholder markers, case-insensitively.
fn is_blank(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty()
        || PLACEHOLDERS
            .iter()
            .any(|p| trimmed.eq_ignore_ascii_case(p))
}

/// Trimmed cell text, or `""` for empty and placeholder cells.
pub fn clean_string(cell: &Data) -> String {
    let text = cell_text(cell);
    if is_blank(&text) {
        String::new()
    } else {
        text.trim().to_string()
    }
}

pub fn clean_float(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) if !is_blank(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Integer via a float step, truncating: `"12.0"` → 12, `"12.5"` → 12.
pub fn clean_int(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        _ => clean_float(cell).and_then(truncate_to_i64),
    }
}

pub(crate) fn truncate_to_i64(f: f64) -> Option<i64> {
    let truncated = f.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Some(truncated as i64)
    } else {
        None
    }
}

/// Date from a date-typed cell or day-first text; anything else is `None`.
///
/// Plain numeric cells are not treated as Excel serials: the workbook
/// already marks real dates with a date format.
pub fn clean_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|ndt| ndt.date()),
        Data::DateTimeIso(s) | Data::String(s) => parse_day_first(s),
        _ => None,
    }
}

fn numeric_date_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^(\d{1,4})[-/. ](\d{1,2})[-/. ](\d{1,4})(?:[ T]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?)?$").ok()
        })
        .as_ref()
}

fn month_name_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(\d{1,2})[-/. ]([A-Za-z]{3,9})\.?[-/., ]+(\d{2}|\d{4})$").ok())
        .as_ref()
}

/// Parse free-form date text, reading `a-b-c` as day-month-year.
///
/// A leading four-digit group is read as year-month-day. When day-first
/// gives an impossible date (`12/25/2024`) the month-first reading is tried.
pub fn parse_day_first(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if is_blank(text) {
        return None;
    }

    if let Some(caps) = numeric_date_pattern()?.captures(text) {
        let (a, b, c) = (&caps[1], &caps[2], &caps[3]);
        let first: u32 = a.parse().ok()?;
        let second: u32 = b.parse().ok()?;

        if a.len() == 4 {
            let year: i32 = a.parse().ok()?;
            let day: u32 = c.parse().ok()?;
            return NaiveDate::from_ymd_opt(year, second, day);
        }
        if !matches!(c.len(), 2 | 4) {
            return None;
        }
        let year = expand_year(c)?;
        return NaiveDate::from_ymd_opt(year, second, first)
            .or_else(|| NaiveDate::from_ymd_opt(year, first, second));
    }

    if let Some(caps) = month_name_pattern().and_then(|p| p.captures(text)) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_from_name(&caps[2])?;
        let year = expand_year(&caps[3])?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

fn expand_year(digits: &str) -> Option<i32> {
    expand_year_around(digits, Local::now().year())
}

/// Two-digit years resolve into the 100-year window centred on
/// `reference_year`: at most 49 years ahead, at most 50 years back.
fn expand_year_around(digits: &str, reference_year: i32) -> Option<i32> {
    let value: i32 = digits.parse().ok()?;
    match digits.len() {
        4 => Some(value),
        2 => {
            let year = reference_year - reference_year.rem_euclid(100) + value;
            if year >= reference_year + 50 {
                Some(year - 100)
            } else if year < reference_year - 50 {
                Some(year + 100)
            } else {
                Some(year)
            }
        }
        _ => None,
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let lower = name.to_lowercase();
    let month = MONTHS.iter().position(|m| lower.starts_with(m))? as u32 + 1;
    // "Sept" is a common spelling; otherwise only the abbreviation or full name
    let full = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ][month as usize - 1];
    if lower.len() == 3 || lower == full || lower == "sept" {
        Some(month)
    } else {
        None
    }
}

/// Normalize party header text: collapse whitespace, lower-case, then
/// capitalize each word (`"  ACME   traders "` → `"Acme Traders"`).
///
/// A letter is capitalized when the character before it is not a letter,
/// so `"o'neil & sons"` becomes `"O'Neil & Sons"`.
pub fn normalize_party(text: &str) -> String {
    let collapsed = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut out = String::with_capacity(collapsed.len());
    let mut prev_is_letter = false;
    for ch in collapsed.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.push(ch);
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}
