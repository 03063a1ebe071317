//! Core module - record model, parsing, aggregation and drill-down

mod aggregator;
mod drilldown;
mod expansion;
mod parse;
mod quarter;
mod types;

pub(crate) use aggregator::{CostDimension, CostGroup, all_years, label_groups};
pub(crate) use drilldown::{DrillDownKey, query, search};
pub(crate) use expansion::{Column, ExpansionState, visible_columns};
pub(crate) use parse::CostParser;
pub(crate) use quarter::{QuarterDef, QuarterMapping};
pub(crate) use types::{DateFilter, Record, RecordFilter, known_descriptions, sort_by_due_date};
