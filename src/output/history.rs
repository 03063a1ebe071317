//! Wheelset measurement history
//!
//! Columns are not fixed: the locomotive and work-order fields come first,
//! followed by every other field of the first record in upstream order.

use comfy_table::{Cell, Table};
use serde_json::Value;

use crate::consts::wheelset_fields;
use crate::core::Record;
use crate::output::format::{
    MAX_TEXT_LEN, MISSING, create_styled_table, header_cell, print_summary_line, truncate_text,
};

const PRIORITY_FIELDS: [&str; 3] = [
    wheelset_fields::LOCOMOTIVE,
    wheelset_fields::HOMOLOGATION_DATE,
    wheelset_fields::WORK_ORDER_NUMBER,
];

#[derive(Debug, Clone, Copy)]
pub(crate) struct HistoryTableOptions {
    pub(crate) use_color: bool,
    pub(crate) elapsed_ms: Option<f64>,
}

/// Id-like keys such as `_id` or `Wheel_ID`
fn is_id_field(key: &str) -> bool {
    key.to_lowercase().split('_').skip(1).any(|part| part == "id")
}

/// Field names to show, in display order. Empty when there are no records.
pub(crate) fn history_columns(records: &[&Record]) -> Vec<String> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    let rest = first
        .raw
        .keys()
        .filter(|k| !is_id_field(k) && !PRIORITY_FIELDS.contains(&k.as_str()))
        .cloned();
    PRIORITY_FIELDS
        .iter()
        .map(|f| f.to_string())
        .chain(rest)
        .collect()
}

/// "Work_Order_Number" -> "Work Order Number", "wonum" -> "Wonum"
pub(crate) fn prettify_header(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut in_word = false;
    for c in field.chars() {
        if c == '_' {
            out.push(' ');
            in_word = false;
            continue;
        }
        out.push(if in_word { c } else { c.to_ascii_uppercase() });
        in_word = c.is_ascii_alphanumeric();
    }
    out
}

/// Display text of one field; nested values are shown as compact JSON
pub(crate) fn history_cell(record: &Record, field: &str) -> Option<String> {
    match record.field(field)? {
        v @ (Value::Object(_) | Value::Array(_)) => Some(v.to_string()),
        _ => record.field_text(field),
    }
}

pub(crate) fn history_table(records: &[&Record], columns: &[String], use_color: bool) -> Table {
    let mut table = create_styled_table();
    table.set_header(
        columns
            .iter()
            .map(|c| header_cell(&prettify_header(c), use_color))
            .collect::<Vec<_>>(),
    );
    for record in records {
        table.add_row(
            columns
                .iter()
                .map(|field| {
                    let text = history_cell(record, field)
                        .map_or_else(|| MISSING.to_string(), |t| truncate_text(&t, MAX_TEXT_LEN));
                    Cell::new(text)
                })
                .collect::<Vec<_>>(),
        );
    }
    table
}

/// Panel title: the locomotive when exactly one is selected
pub(crate) fn history_title(locos: &[String]) -> String {
    match locos {
        [loco] => format!("History {loco}"),
        _ => "Wheelset History".to_string(),
    }
}

pub(crate) fn print_history_table(title: &str, records: &[&Record], opts: HistoryTableOptions) {
    let columns = history_columns(records);
    let table = history_table(records, &columns, opts.use_color);

    println!("\n  {title}\n");
    println!("{table}");
    print_summary_line(
        &format!("{} measurements", records.len()),
        opts.elapsed_ms,
        opts.use_color,
    );
}
