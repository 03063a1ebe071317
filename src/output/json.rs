use serde_json::{Value, json};

use crate::core::{Column, CostGroup, DrillDownKey, Record};
use crate::output::listing::DrillTotals;
use crate::output::rollup::grand_total;

fn to_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Rollup with the full nested trees of every group
pub(crate) fn output_rollup_json(
    groups: &[CostGroup],
    years: &[String],
    columns: &[Column],
    unit: &str,
) -> String {
    let groups_json: Vec<Value> = groups
        .iter()
        .map(|g| {
            json!({
                "label": g.label,
                "total": g.total(),
                "details": g.details,
            })
        })
        .collect();

    let columns_json: Vec<Value> = columns
        .iter()
        .map(|c| json!({ "header": c.header(), "key": c.drill_key(None) }))
        .collect();

    to_pretty(&json!({
        "currency": unit,
        "years": years,
        "columns": columns_json,
        "groups": groups_json,
        "grand_total": grand_total(groups),
    }))
}

/// Records as an array of their raw upstream objects
pub(crate) fn output_records_json(records: &[&Record]) -> String {
    to_pretty(&json!(records))
}

pub(crate) fn output_drill_json(
    key: &DrillDownKey,
    records: &[&Record],
    totals: &DrillTotals,
    unit: &str,
) -> String {
    let per_dimension: serde_json::Map<String, Value> = totals
        .per_dimension
        .iter()
        .map(|(label, amount)| (label.clone(), json!(amount)))
        .collect();

    to_pretty(&json!({
        "title": key.title(),
        "key": key,
        "currency": unit,
        "totals": per_dimension,
        "total": totals.total,
        "records": records,
    }))
}

pub(crate) fn output_descriptions_json(descriptions: &[String]) -> String {
    to_pretty(&json!(descriptions))
}
