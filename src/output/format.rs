use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, TableComponent,
    modifiers::UTF8_SOLID_INNER_BORDERS, presets::UTF8_FULL,
};

use crate::core::Record;

/// Longest free-text description shown in a table cell
pub(super) const MAX_TEXT_LEN: usize = 150;

/// Placeholder for a missing listing value
pub(super) const MISSING: &str = "-";

/// Cell text for an amount: two decimals plus unit, or exactly `0 <unit>`
/// for an amount that rounds to zero cents.
pub(crate) fn format_amount(amount: f64, unit: &str) -> String {
    if (amount * 100.0).round() == 0.0 {
        format!("0 {unit}")
    } else {
        format!("{amount:.2} {unit}")
    }
}

/// Cut `text` to `max` characters, appending "..." when anything was cut
pub(super) fn truncate_text(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

pub(super) fn field_or_missing(record: &Record, field: &str) -> String {
    record
        .field_text(field)
        .unwrap_or_else(|| MISSING.to_string())
}

pub(super) fn styled_cell(text: &str, color: Option<Color>, bold: bool) -> Cell {
    let mut cell = Cell::new(text);
    if let Some(c) = color {
        cell = cell.fg(c);
    }
    if bold {
        cell = cell.add_attribute(Attribute::Bold);
    }
    cell
}

pub(super) fn header_cell(text: &str, use_color: bool) -> Cell {
    let mut cell = Cell::new(text).add_attribute(Attribute::Bold);
    if use_color {
        cell = cell.fg(Color::Cyan);
    }
    cell
}

pub(super) fn right_cell(text: &str, color: Option<Color>, bold: bool) -> Cell {
    styled_cell(text, color, bold).set_alignment(CellAlignment::Right)
}

/// Replace the double-line header separator (╞═╪═╡) with single-line (├─┼─┤)
fn normalize_header_separator(table: &mut Table) {
    table.set_style(TableComponent::HeaderLines, '─');
    table.set_style(TableComponent::LeftHeaderIntersection, '├');
    table.set_style(TableComponent::MiddleHeaderIntersections, '┼');
    table.set_style(TableComponent::RightHeaderIntersection, '┤');
}

/// Create a table with the standard preset, inner borders, and normalized header separator.
pub(super) fn create_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    normalize_header_separator(&mut table);
    table
}

/// Print the summary line under a table, with optional timing
pub(super) fn print_summary_line(text: &str, elapsed_ms: Option<f64>, use_color: bool) {
    match elapsed_ms {
        Some(ms) if use_color => println!("\n  {text} | \x1b[36m{ms:.0}ms\x1b[0m\n"),
        Some(ms) => println!("\n  {text} | {ms:.0}ms\n"),
        None => println!("\n  {text}\n"),
    }
}
