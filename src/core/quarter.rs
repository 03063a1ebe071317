//! Quarter bucketing driven by a configurable quarter -> months table

use chrono::Month;
use serde::Serialize;

use crate::core::parse::DueDate;
use crate::error::AppError;

/// One quarter and the month names it covers, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct QuarterDef {
    pub(crate) name: String,
    pub(crate) months: Vec<String>,
}

/// Ordered quarter table, e.g. Q1 -> [January, February, March]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct QuarterMapping {
    quarters: Vec<QuarterDef>,
}

impl Default for QuarterMapping {
    fn default() -> Self {
        Self::standard()
    }
}

impl QuarterMapping {
    pub(crate) fn new(quarters: Vec<QuarterDef>) -> Self {
        QuarterMapping { quarters }
    }

    /// Calendar quarters: Jan-Mar, Apr-Jun, Jul-Sep, Oct-Dec
    pub(crate) fn standard() -> Self {
        let quarters = (0..4)
            .map(|q| QuarterDef {
                name: format!("Q{}", q + 1),
                months: (1..=3)
                    .map(|m| month_name(q * 3 + m).to_string())
                    .collect(),
            })
            .collect();
        QuarterMapping { quarters }
    }

    pub(crate) fn quarters(&self) -> &[QuarterDef] {
        &self.quarters
    }

    #[cfg(test)]
    pub(crate) fn months_of(&self, quarter: &str) -> Option<&[String]> {
        self.quarters
            .iter()
            .find(|q| q.name == quarter)
            .map(|q| q.months.as_slice())
    }

    /// Find the quarter whose month list contains `month_name`.
    pub(crate) fn quarter_of(&self, month_name: &str) -> Option<&str> {
        self.quarters
            .iter()
            .find(|q| q.months.iter().any(|m| m == month_name))
            .map(|q| q.name.as_str())
    }

    /// Check that every calendar month is mapped exactly once, to a uniquely
    /// named quarter.
    pub(crate) fn validate(&self) -> Result<(), AppError> {
        let invalid = |reason: String| Err(AppError::InvalidQuarterMapping { reason });

        if self.quarters.is_empty() {
            return invalid("no quarters defined".to_string());
        }
        let mut seen_quarters: Vec<&str> = Vec::new();
        let mut seen_months: Vec<&str> = Vec::new();
        for quarter in &self.quarters {
            if quarter.name.trim().is_empty() || quarter.name.contains('-') {
                return invalid(format!("bad quarter name \"{}\"", quarter.name));
            }
            if seen_quarters.contains(&quarter.name.as_str()) {
                return invalid(format!("quarter {} defined twice", quarter.name));
            }
            seen_quarters.push(&quarter.name);

            for month in &quarter.months {
                if !(1..=12).any(|m| month_name(m) == month) {
                    return invalid(format!("\"{month}\" is not a month name"));
                }
                if seen_months.contains(&month.as_str()) {
                    return invalid(format!("{month} is mapped more than once"));
                }
                seen_months.push(month);
            }
        }
        if let Some(missing) = (1..=12).map(month_name).find(|m| !seen_months.contains(m)) {
            return invalid(format!("{missing} is not mapped to any quarter"));
        }
        Ok(())
    }
}

/// Temporal coordinates of one record inside an aggregation tree
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Bucket {
    pub(crate) year: String,
    pub(crate) quarter: String,
    pub(crate) month: String,
}

impl Bucket {
    pub(crate) fn from_due_date(date: &DueDate, mapping: &QuarterMapping) -> Option<Self> {
        let quarter = mapping.quarter_of(&date.month_name)?;
        Some(Bucket {
            year: date.year.clone(),
            quarter: quarter.to_string(),
            month: date.month_name.clone(),
        })
    }

    /// Bucket for a raw date string; `None` when the date is unusable or its
    /// month is not in the mapping.
    #[cfg(test)]
    pub(crate) fn from_date_str(raw: &str, mapping: &QuarterMapping) -> Option<Self> {
        crate::core::parse::parse_due_date(raw).and_then(|d| Self::from_due_date(&d, mapping))
    }
}

/// Long English month name for 1..=12
pub(crate) fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("")
}
