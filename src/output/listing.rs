//! Record listing and drill-down panel tables

use comfy_table::{Cell, Color, Table};

use crate::consts::fields;
use crate::core::{CostDimension, Record};
use crate::output::format::{
    MAX_TEXT_LEN, MISSING, create_styled_table, field_or_missing, format_amount, header_cell,
    print_summary_line, right_cell, styled_cell, truncate_text,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct ListingTableOptions<'a> {
    pub(crate) use_color: bool,
    pub(crate) dimensions: &'a [CostDimension],
    pub(crate) elapsed_ms: Option<f64>,
}

/// Free-text column: the PM description, else the plain description field
fn description_text(record: &Record) -> String {
    record
        .field_text(fields::PM_DESCRIPTION)
        .or_else(|| record.field_text(fields::FREE_TEXT))
        .map_or_else(|| MISSING.to_string(), |d| truncate_text(&d, MAX_TEXT_LEN))
}

pub(crate) fn listing_table(records: &[&Record], opts: &ListingTableOptions<'_>) -> Table {
    let c = opts.use_color;
    let mut table = create_styled_table();

    let mut header = vec![
        header_cell("Locomotive", c),
        header_cell("Next Due Date", c),
        header_cell("WO Number", c),
        header_cell("Description", c),
    ];
    header.extend(opts.dimensions.iter().map(|d| header_cell(&d.label, c)));
    header.push(header_cell("Total Budget", c));
    table.set_header(header);

    let service_color = if c { Some(Color::Yellow) } else { None };
    for record in records {
        let name_color = if record.is_service_event() {
            service_color
        } else {
            None
        };
        let mut row = vec![
            styled_cell(&record.description, name_color, false),
            Cell::new(field_or_missing(record, fields::DUE_DATE)),
            Cell::new(field_or_missing(record, fields::WORK_ORDER)),
            Cell::new(description_text(record)),
        ];
        row.extend(
            opts.dimensions
                .iter()
                .map(|d| right_cell(&field_or_missing(record, &d.field), None, false)),
        );
        row.push(right_cell(
            &field_or_missing(record, fields::TOTAL_BUDGET),
            None,
            false,
        ));
        table.add_row(row);
    }
    table
}

pub(crate) fn print_listing_table(records: &[&Record], opts: ListingTableOptions<'_>) {
    let table = listing_table(records, &opts);
    let service_events = records.iter().filter(|r| r.is_service_event()).count();

    println!("\n  Maintenance Records\n");
    println!("{table}");
    let mut summary = format!("{} records", records.len());
    if service_events > 0 {
        summary.push_str(&format!(" ({service_events} service events)"));
    }
    print_summary_line(&summary, opts.elapsed_ms, opts.use_color);
}

/// Per-dimension totals of a drill-down, followed by their sum
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DrillTotals {
    pub(crate) per_dimension: Vec<(String, f64)>,
    pub(crate) total: f64,
}

pub(crate) fn drill_totals_table(totals: &DrillTotals, unit: &str, use_color: bool) -> Table {
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("Cost Type", use_color),
        header_cell("Amount", use_color),
    ]);
    for (label, amount) in &totals.per_dimension {
        table.add_row(vec![
            Cell::new(label),
            right_cell(&format_amount(*amount, unit), None, false),
        ]);
    }
    let green = if use_color { Some(Color::Green) } else { None };
    table.add_row(vec![
        styled_cell(crate::consts::TOTAL_LABEL, green, true),
        right_cell(&format_amount(totals.total, unit), green, true),
    ]);
    table
}

/// Side panel: title, matching records, then the totals block
pub(crate) fn print_drill_panel(
    title: &str,
    records: &[&Record],
    totals: &DrillTotals,
    unit: &str,
    opts: ListingTableOptions<'_>,
) {
    println!("\n  {title}\n");
    if records.is_empty() {
        println!("  No matching records.\n");
        return;
    }
    println!("{}", listing_table(records, &opts));
    println!();
    println!("{}", drill_totals_table(totals, unit, opts.use_color));
    print_summary_line(
        &format!("{} records", records.len()),
        opts.elapsed_ms,
        opts.use_color,
    );
}
