mod csv;
mod format;
mod history;
mod json;
mod listing;
mod rollup;

pub(crate) use csv::{output_history_csv, output_listing_csv, output_rollup_csv};
pub(crate) use history::{HistoryTableOptions, history_title, print_history_table};
pub(crate) use json::{
    output_descriptions_json, output_drill_json, output_records_json, output_rollup_json,
};
pub(crate) use listing::{DrillTotals, ListingTableOptions, print_drill_panel, print_listing_table};
pub(crate) use rollup::{RollupTableOptions, print_rollup_table};
