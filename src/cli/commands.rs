//! CLI subcommand definitions

use clap::Subcommand;

/// Main CLI commands
#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Cost rollup by description, year, quarter and month (default)
    Rollup,
    /// Filtered record listing
    List {
        /// Merge in service events from the second form
        #[arg(long)]
        service_events: bool,
        /// Read service events from JSON snapshot files (implies --service-events)
        #[arg(long, value_name = "GLOB")]
        service_input: Option<String>,
    },
    /// Records behind one rollup cell, with per-dimension totals
    Drill(DrillArgs),
    /// Distinct locomotive descriptions available for filtering
    Descriptions,
    /// Wheelset measurement history (reads --input snapshots when given)
    History,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct DrillArgs {
    /// Calendar year, e.g. 2024
    #[arg(long)]
    pub(crate) year: Option<String>,
    /// Quarter name, e.g. Q1
    #[arg(long)]
    pub(crate) quarter: Option<String>,
    /// Full month name, e.g. February
    #[arg(long)]
    pub(crate) month: Option<String>,
    /// Description (case-insensitive)
    #[arg(long)]
    pub(crate) description: Option<String>,
    /// Keep only records with a field containing this text
    #[arg(long, value_name = "TERM")]
    pub(crate) search: Option<String>,
}
