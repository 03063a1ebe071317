//! Reverse lookup from an aggregate cell to the records behind it

use serde::Serialize;

use crate::core::quarter::QuarterMapping;
use crate::core::types::{Record, description_key};

/// Partially specified cell coordinate. `None` components match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub(crate) struct DrillDownKey {
    pub(crate) year: Option<String>,
    pub(crate) quarter: Option<String>,
    pub(crate) month: Option<String>,
    pub(crate) description: Option<String>,
}

impl DrillDownKey {
    pub(crate) fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.quarter.is_none()
            && self.month.is_none()
            && self.description.is_none()
    }

    pub(crate) fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(str::to_string);
        self
    }

    /// Human-readable title for the side panel, e.g. "LocoA 2024 Q1 February"
    pub(crate) fn title(&self) -> String {
        let parts: Vec<&str> = [
            self.description.as_deref(),
            self.year.as_deref(),
            self.quarter.as_deref(),
            self.month.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();
        if parts.is_empty() {
            "All records".to_string()
        } else {
            parts.join(" ")
        }
    }

    fn matches(&self, record: &Record, mapping: &QuarterMapping) -> bool {
        if let Some(wanted) = &self.description
            && record.description_key() != description_key(wanted)
        {
            return false;
        }

        if self.year.is_none() && self.quarter.is_none() && self.month.is_none() {
            return true;
        }
        let Some(due) = record.due() else {
            return false;
        };

        if let Some(year) = &self.year
            && due.year != *year
        {
            return false;
        }
        if let Some(quarter) = &self.quarter
            && mapping.quarter_of(&due.month_name) != Some(quarter.as_str())
        {
            return false;
        }
        if let Some(month) = &self.month
            && due.month_name != *month
        {
            return false;
        }
        true
    }
}

/// Records matching every present component of `key`, in input order.
///
/// An empty key returns all records unchanged.
pub(crate) fn query<'a>(
    records: &'a [Record],
    key: &DrillDownKey,
    mapping: &QuarterMapping,
) -> Vec<&'a Record> {
    if key.is_empty() {
        return records.iter().collect();
    }
    records.iter().filter(|r| key.matches(r, mapping)).collect()
}

/// Narrow a drill-down result to records where any scalar field contains
/// `term` (case-insensitive). A blank term keeps everything.
pub(crate) fn search<'a>(records: Vec<&'a Record>, term: &str) -> Vec<&'a Record> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| {
            r.raw.values().any(|v| match v {
                serde_json::Value::String(s) => s.to_lowercase().contains(&needle),
                serde_json::Value::Number(n) => n.to_string().contains(&needle),
                _ => false,
            })
        })
        .collect()
}
