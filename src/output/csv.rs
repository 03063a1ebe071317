use std::fmt::Write;

use crate::consts::fields;
use crate::core::{Column, CostDimension, CostGroup, Record};
use crate::output::history::{history_cell, history_columns};

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Listing export: the raw field values, one row per record
pub(crate) fn output_listing_csv(records: &[&Record], dimensions: &[CostDimension]) -> String {
    let mut columns = vec![
        fields::ID,
        fields::DESCRIPTION,
        fields::DUE_DATE,
        fields::WORK_ORDER,
        fields::PM_DESCRIPTION,
    ];
    columns.extend(dimensions.iter().map(|d| d.field.as_str()));
    columns.push(fields::TOTAL_BUDGET);

    let mut out = columns.join(",");
    out.push('\n');
    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|field| csv_escape(&record.field_text(field).unwrap_or_default()))
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Wheelset history export with the same dynamic columns as the table,
/// headed by the raw field names
pub(crate) fn output_history_csv(records: &[&Record]) -> String {
    let columns = history_columns(records);
    let mut out = columns
        .iter()
        .map(|c| csv_escape(c))
        .collect::<Vec<_>>()
        .join(",");
    out.push('\n');
    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|field| csv_escape(&history_cell(record, field).unwrap_or_default()))
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Rollup export: one row per (group, description), one column per visible
/// period plus the row total.
pub(crate) fn output_rollup_csv(groups: &[CostGroup], columns: &[Column]) -> String {
    let mut out = String::from("group,description");
    for column in columns {
        let _ = write!(out, ",{}", csv_escape(&column.header()));
    }
    out.push_str(",total\n");

    for group in groups {
        for node in &group.details {
            let _ = write!(
                out,
                "{},{}",
                csv_escape(&group.label),
                csv_escape(&node.description)
            );
            for column in columns {
                let _ = write!(out, ",{:.2}", column.node_value(node));
            }
            let _ = writeln!(out, ",{:.2}", node.total());
        }
    }
    out
}
