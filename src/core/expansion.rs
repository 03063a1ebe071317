//! Year/quarter expansion state and the columns it materializes
//!
//! State is a pair of key sets passed around by value; toggling returns a
//! new state and never mutates the old one.

use std::collections::BTreeSet;

use crate::core::aggregator::{CostGroup, DescriptionNode};
use crate::core::drilldown::DrillDownKey;
use crate::core::quarter::QuarterMapping;
use crate::error::AppError;

/// Return a copy of `set` with `key` removed if present, added otherwise.
pub(crate) fn toggle(set: &BTreeSet<String>, key: &str) -> BTreeSet<String> {
    let mut next = set.clone();
    if !next.remove(key) {
        next.insert(key.to_string());
    }
    next
}

pub(crate) fn is_expanded(set: &BTreeSet<String>, key: &str) -> bool {
    set.contains(key)
}

/// Composite key for a quarter, e.g. "2024-Q1"
pub(crate) fn quarter_key(year: &str, quarter: &str) -> String {
    format!("{year}-{quarter}")
}

/// Expanded years and expanded `"year-quarter"` keys; all collapsed initially
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ExpansionState {
    years: BTreeSet<String>,
    quarters: BTreeSet<String>,
}

impl ExpansionState {
    pub(crate) fn toggle_year(&self, year: &str) -> Self {
        ExpansionState {
            years: toggle(&self.years, year),
            quarters: self.quarters.clone(),
        }
    }

    pub(crate) fn toggle_quarter(&self, year: &str, quarter: &str) -> Self {
        ExpansionState {
            years: self.years.clone(),
            quarters: toggle(&self.quarters, &quarter_key(year, quarter)),
        }
    }

    pub(crate) fn is_year_expanded(&self, year: &str) -> bool {
        is_expanded(&self.years, year)
    }

    /// Raw quarter state, independent of whether its year is open
    pub(crate) fn is_quarter_expanded(&self, year: &str, quarter: &str) -> bool {
        is_expanded(&self.quarters, &quarter_key(year, quarter))
    }

    /// Month columns show only while both the year and the quarter are open
    pub(crate) fn is_quarter_visible(&self, year: &str, quarter: &str) -> bool {
        self.is_year_expanded(year) && self.is_quarter_expanded(year, quarter)
    }

    /// Apply `--expand` keys in order: "2024" toggles a year,
    /// "2024-Q1" toggles a quarter.
    pub(crate) fn from_keys<S: AsRef<str>>(keys: &[S]) -> Result<Self, AppError> {
        keys.iter().try_fold(ExpansionState::default(), |state, key| {
            let key = key.as_ref().trim();
            let invalid = || AppError::InvalidExpandKey {
                input: key.to_string(),
            };
            match key.split_once('-') {
                None if !key.is_empty() => Ok(state.toggle_year(key)),
                Some((year, quarter)) if !year.is_empty() && !quarter.is_empty() => {
                    Ok(state.toggle_quarter(year, quarter))
                }
                _ => Err(invalid()),
            }
        })
    }
}

/// One materialized display column
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Column {
    Year {
        year: String,
    },
    Quarter {
        year: String,
        quarter: String,
    },
    Month {
        year: String,
        quarter: String,
        month: String,
    },
}

impl Column {
    pub(crate) fn header(&self) -> String {
        match self {
            Column::Year { year } => year.clone(),
            Column::Quarter { year, quarter } => quarter_key(year, quarter),
            Column::Month { year, month, .. } => format!("{month} {year}"),
        }
    }

    pub(crate) fn node_value(&self, node: &DescriptionNode) -> f64 {
        match self {
            Column::Year { year } => node.year_total(year),
            Column::Quarter { year, quarter } => node.quarter_total(year, quarter),
            Column::Month {
                year,
                quarter,
                month,
            } => node.month_total(year, quarter, month),
        }
    }

    pub(crate) fn group_value(&self, group: &CostGroup) -> f64 {
        match self {
            Column::Year { year } => group.year_total(year),
            Column::Quarter { year, quarter } => group.quarter_total(year, quarter),
            Column::Month {
                year,
                quarter,
                month,
            } => group.month_total(year, quarter, month),
        }
    }

    /// Drill-down key recovering the records behind this column's cell in
    /// the row for `description` (`None` for a group row).
    pub(crate) fn drill_key(&self, description: Option<&str>) -> DrillDownKey {
        let key = match self {
            Column::Year { year } => DrillDownKey {
                year: Some(year.clone()),
                ..Default::default()
            },
            Column::Quarter { year, quarter } => DrillDownKey {
                year: Some(year.clone()),
                quarter: Some(quarter.clone()),
                ..Default::default()
            },
            Column::Month {
                year,
                quarter,
                month,
            } => DrillDownKey {
                year: Some(year.clone()),
                quarter: Some(quarter.clone()),
                month: Some(month.clone()),
                description: None,
            },
        };
        key.with_description(description)
    }
}

/// Columns to display for `years` under `state`: each year, followed by its
/// quarters when expanded, each followed by its months when visible.
pub(crate) fn visible_columns(
    years: &[String],
    state: &ExpansionState,
    mapping: &QuarterMapping,
) -> Vec<Column> {
    let mut columns = Vec::new();
    for year in years {
        columns.push(Column::Year { year: year.clone() });
        if !state.is_year_expanded(year) {
            continue;
        }
        for quarter in mapping.quarters() {
            columns.push(Column::Quarter {
                year: year.clone(),
                quarter: quarter.name.clone(),
            });
            if !state.is_quarter_visible(year, &quarter.name) {
                continue;
            }
            for month in &quarter.months {
                columns.push(Column::Month {
                    year: year.clone(),
                    quarter: quarter.name.clone(),
                    month: month.clone(),
                });
            }
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    fn headers(columns: &[Column]) -> Vec<String> {
        columns.iter().map(Column::header).collect()
    }

    fn years(list: &[&str]) -> Vec<String> {
        list.iter().map(|y| y.to_string()).collect()
    }

    // --- toggle ---

    #[test]
    fn toggle_adds_then_removes() {
        let s = set(&[]);
        let once = toggle(&s, "2024");
        assert!(is_expanded(&once, "2024"));
        let twice = toggle(&once, "2024");
        assert_eq!(twice, s);
    }

    #[test]
    fn toggle_does_not_touch_input() {
        let s = set(&["2023"]);
        let next = toggle(&s, "2024");
        assert_eq!(s, set(&["2023"]));
        assert_eq!(next, set(&["2023", "2024"]));
    }

    #[test]
    fn double_toggle_is_identity_for_any_start() {
        for start in [set(&[]), set(&["2024"]), set(&["2023", "2024-Q1"])] {
            for key in ["2024", "2024-Q1", "2025"] {
                assert_eq!(toggle(&toggle(&start, key), key), start);
            }
        }
    }

    // --- ExpansionState ---

    #[test]
    fn initial_state_all_collapsed() {
        let s = ExpansionState::default();
        assert!(!s.is_year_expanded("2024"));
        assert!(!s.is_quarter_expanded("2024", "Q1"));
    }

    #[test]
    fn quarter_visibility_gated_by_year() {
        let s = ExpansionState::default().toggle_quarter("2024", "Q1");
        assert!(s.is_quarter_expanded("2024", "Q1"));
        assert!(!s.is_quarter_visible("2024", "Q1"));

        let s = s.toggle_year("2024");
        assert!(s.is_quarter_visible("2024", "Q1"));

        // Collapsing the year hides the quarter but keeps its state
        let s = s.toggle_year("2024");
        assert!(!s.is_quarter_visible("2024", "Q1"));
        assert!(s.is_quarter_expanded("2024", "Q1"));
    }

    #[test]
    fn from_keys_applies_in_order() {
        let s = ExpansionState::from_keys(&["2024", "2024-Q2", "2023", "2023"]).unwrap();
        assert!(s.is_year_expanded("2024"));
        assert!(!s.is_year_expanded("2023"));
        assert!(s.is_quarter_visible("2024", "Q2"));
    }

    #[test]
    fn from_keys_rejects_malformed() {
        assert!(ExpansionState::from_keys(&[""]).is_err());
        assert!(ExpansionState::from_keys(&["-Q1"]).is_err());
        assert!(ExpansionState::from_keys(&["2024-"]).is_err());
        assert!(ExpansionState::from_keys::<&str>(&[]).unwrap() == ExpansionState::default());
    }

    // --- columns ---

    #[test]
    fn collapsed_shows_years_only() {
        let cols = visible_columns(
            &years(&["2023", "2024"]),
            &ExpansionState::default(),
            &QuarterMapping::standard(),
        );
        assert_eq!(headers(&cols), ["2023", "2024"]);
    }

    #[test]
    fn expanded_year_shows_quarters_inline() {
        let state = ExpansionState::default().toggle_year("2023");
        let cols = visible_columns(&years(&["2023", "2024"]), &state, &QuarterMapping::standard());
        assert_eq!(
            headers(&cols),
            ["2023", "2023-Q1", "2023-Q2", "2023-Q3", "2023-Q4", "2024"]
        );
    }

    #[test]
    fn expanded_quarter_shows_months() {
        let state = ExpansionState::default()
            .toggle_year("2024")
            .toggle_quarter("2024", "Q2");
        let cols = visible_columns(&years(&["2024"]), &state, &QuarterMapping::standard());
        assert_eq!(
            headers(&cols),
            [
                "2024",
                "2024-Q1",
                "2024-Q2",
                "April 2024",
                "May 2024",
                "June 2024",
                "2024-Q3",
                "2024-Q4"
            ]
        );
    }

    #[test]
    fn expanded_quarter_of_collapsed_year_shows_nothing() {
        let state = ExpansionState::default().toggle_quarter("2024", "Q2");
        let cols = visible_columns(&years(&["2024"]), &state, &QuarterMapping::standard());
        assert_eq!(headers(&cols), ["2024"]);
    }

    #[test]
    fn drill_key_matches_column() {
        let col = Column::Month {
            year: "2024".into(),
            quarter: "Q1".into(),
            month: "February".into(),
        };
        let key = col.drill_key(Some("LocoA"));
        assert_eq!(key.year.as_deref(), Some("2024"));
        assert_eq!(key.quarter.as_deref(), Some("Q1"));
        assert_eq!(key.month.as_deref(), Some("February"));
        assert_eq!(key.description.as_deref(), Some("LocoA"));

        let key = Column::Year { year: "2024".into() }.drill_key(None);
        assert_eq!(key.year.as_deref(), Some("2024"));
        assert!(key.quarter.is_none());
        assert!(key.description.is_none());
    }
}
