//! Lenient field parsing for upstream records
//!
//! The form API hands out costs as currency strings and dates as plain
//! strings of varying quality. Nothing here fails: bad costs become 0 and
//! bad dates become `None`.

use chrono::NaiveDate;
use serde_json::Value;

use crate::consts::DEFAULT_CURRENCY;

/// Calendar components of a due date
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DueDate {
    /// Year component as written, e.g. "2024"
    pub(crate) year: String,
    /// Long English month name, e.g. "February"
    pub(crate) month_name: String,
}

/// Parses `"<number> <unit>"` cost strings
#[derive(Debug, Clone)]
pub(crate) struct CostParser {
    unit: String,
    decimal_comma: bool,
}

impl Default for CostParser {
    fn default() -> Self {
        CostParser {
            unit: DEFAULT_CURRENCY.to_string(),
            decimal_comma: true,
        }
    }
}

impl CostParser {
    pub(crate) fn new(unit: impl Into<String>, decimal_comma: bool) -> Self {
        CostParser {
            unit: unit.into(),
            decimal_comma,
        }
    }

    pub(crate) fn unit(&self) -> &str {
        &self.unit
    }

    /// Parse a cost string. The leading number is read and anything after it
    /// ignored, so "12abc EUR" is 12. Returns 0 for `None`, empty input or
    /// text that does not start with a number.
    pub(crate) fn parse(&self, raw: Option<&str>) -> f64 {
        let Some(raw) = raw else {
            return 0.0;
        };
        let mut text = raw.trim();
        if !self.unit.is_empty()
            && let Some(stripped) = text.strip_suffix(self.unit.as_str())
        {
            text = stripped.trim_end();
        }

        let normalized = self.normalize_separators(numeric_prefix(text));
        leading_float(&normalized).unwrap_or(0.0)
    }

    /// Parse a raw JSON field: strings go through [`CostParser::parse`],
    /// numbers are taken as-is, everything else is 0.
    pub(crate) fn parse_value(&self, raw: Option<&Value>) -> f64 {
        match raw {
            Some(Value::String(s)) => self.parse(Some(s)),
            Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// With a comma-decimal convention, "1.234,56" and "100,50" use ',' as the
    /// decimal point and '.' for grouping, while "100.50" (no comma) keeps '.'
    /// as the decimal point. With a period convention ',' is always grouping.
    fn normalize_separators(&self, text: &str) -> String {
        if self.decimal_comma {
            if text.contains(',') {
                text.replace('.', "").replace(',', ".")
            } else {
                text.to_string()
            }
        } else {
            text.replace(',', "")
        }
    }
}

/// Leading run of characters that can belong to a number
fn numeric_prefix(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | ',' | '+' | '-')))
        .unwrap_or(text.len());
    &text[..end]
}

/// Longest prefix of `text` that parses as a finite number
fn leading_float(text: &str) -> Option<f64> {
    (1..=text.len())
        .rev()
        .find_map(|end| text[..end].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Split a `YYYY-MM-DD` string into calendar components.
///
/// Only the year and month parts are required; the day part is ignored.
/// Returns `None` when either part is missing or does not name a real month.
pub(crate) fn parse_due_date(raw: &str) -> Option<DueDate> {
    let mut parts = raw.trim().split('-');
    let year = parts.next()?.trim();
    let month = parts.next()?.trim();
    if year.is_empty() || month.is_empty() {
        return None;
    }

    let y: i32 = year.parse().ok()?;
    let m: u32 = month.parse().ok()?;
    let first = NaiveDate::from_ymd_opt(y, m, 1)?;

    Some(DueDate {
        year: year.to_string(),
        month_name: first.format("%B").to_string(),
    })
}

/// Like [`parse_due_date`] but for a raw JSON field; non-strings are `None`.
pub(crate) fn parse_due_date_value(raw: Option<&Value>) -> Option<DueDate> {
    match raw {
        Some(Value::String(s)) => parse_due_date(s),
        _ => None,
    }
}

/// Parse a full calendar date (used for date-range filtering and sorting).
pub(crate) fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, crate::consts::DATE_FORMAT).ok()
}
