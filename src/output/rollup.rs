//! Cost rollup table: one block per cost group, columns per visible period

use comfy_table::{Cell, Color, Table};

use crate::core::{Column, CostGroup};
use crate::output::format::{
    create_styled_table, format_amount, header_cell, print_summary_line, right_cell, styled_cell,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct RollupTableOptions<'a> {
    pub(crate) use_color: bool,
    pub(crate) breakdown: bool,
    pub(crate) unit: &'a str,
    pub(crate) record_count: usize,
    pub(crate) elapsed_ms: Option<f64>,
}

fn build_header(columns: &[Column], use_color: bool) -> Vec<Cell> {
    let mut header = vec![header_cell("Cost Type", use_color)];
    header.extend(columns.iter().map(|c| header_cell(&c.header(), use_color)));
    header.push(header_cell("Total", use_color));
    header
}

fn add_group_rows(
    table: &mut Table,
    group: &CostGroup,
    columns: &[Column],
    opts: &RollupTableOptions<'_>,
) {
    let color = match (opts.use_color, group.is_total()) {
        (true, true) => Some(Color::Green),
        (true, false) => Some(Color::Cyan),
        (false, _) => None,
    };

    let mut row = vec![styled_cell(&group.label, color, true)];
    row.extend(
        columns
            .iter()
            .map(|c| right_cell(&format_amount(c.group_value(group), opts.unit), color, true)),
    );
    row.push(right_cell(&format_amount(group.total(), opts.unit), color, true));
    table.add_row(row);

    if !opts.breakdown {
        return;
    }
    for node in &group.details {
        let mut row = vec![Cell::new(format!("  {}", node.description))];
        row.extend(
            columns
                .iter()
                .map(|c| right_cell(&format_amount(c.node_value(node), opts.unit), None, false)),
        );
        row.push(right_cell(&format_amount(node.total(), opts.unit), None, false));
        table.add_row(row);
    }
}

pub(crate) fn rollup_table(
    groups: &[CostGroup],
    columns: &[Column],
    opts: &RollupTableOptions<'_>,
) -> Table {
    let mut table = create_styled_table();
    table.set_header(build_header(columns, opts.use_color));
    for group in groups {
        add_group_rows(&mut table, group, columns, opts);
    }
    table
}

/// Grand total: the total of the combined group
pub(crate) fn grand_total(groups: &[CostGroup]) -> f64 {
    groups
        .iter()
        .find(|g| g.is_total())
        .map(CostGroup::total)
        .unwrap_or(0.0)
}

pub(crate) fn print_rollup_table(
    groups: &[CostGroup],
    columns: &[Column],
    opts: RollupTableOptions<'_>,
) {
    let table = rollup_table(groups, columns, &opts);
    let descriptions = groups
        .iter()
        .find(|g| g.is_total())
        .map_or(0, |g| g.details.len());

    println!("\n  Maintenance Cost Rollup\n");
    println!("{table}");
    print_summary_line(
        &format!(
            "Grand total {} | {} records, {} locomotives",
            format_amount(grand_total(groups), opts.unit),
            opts.record_count,
            descriptions
        ),
        opts.elapsed_ms,
        opts.use_color,
    );
}
