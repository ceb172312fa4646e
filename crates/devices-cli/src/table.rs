//! Plain-text rendering of a view for the terminal.

use devices_core::{Cell, Table, ViewBody, ViewModel};
use unicode_width::UnicodeWidthStr;

const PROGRESS_TEXT: &str = "Loading...";

/// Render the view body as aligned text. Alerts are reported separately on stderr.
///
/// `max_cell_width` of 0 disables truncation.
pub fn render_text(view: &ViewModel, max_cell_width: usize) -> String {
    let mut out = String::new();
    if let Some(route) = &view.create_route {
        out.push_str(&format!("Create: {route}\n\n"));
    }
    match &view.body {
        ViewBody::Progress => out.push_str(PROGRESS_TEXT),
        ViewBody::NoData { message } => out.push_str(message),
        ViewBody::Table(table) => write_table(&mut out, table, max_cell_width),
    }
    out.push('\n');
    out
}

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Link { text, href } => format!("{text} <{href}>"),
        Cell::Text { text } => text.clone(),
        Cell::Empty => String::new(),
    }
}

fn write_table(out: &mut String, table: &Table, max_cell_width: usize) {
    let header: Vec<String> = table
        .headers
        .iter()
        .map(|h| truncate(&h.name, max_cell_width))
        .collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            row.cells
                .iter()
                .map(|cell| truncate(&cell_text(cell), max_cell_width))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.width()).collect();
    for row in &rows {
        for (idx, text) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(text.width());
            }
        }
    }

    write_line(out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    for row in &rows {
        write_line(out, row, &widths);
    }
    // Callers append the final newline.
    if out.ends_with('\n') {
        out.pop();
    }
}

fn write_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(text, width)| {
            let pad = width.saturating_sub(text.width());
            format!("{text}{}", " ".repeat(pad))
        })
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}

fn truncate(text: &str, max_width: usize) -> String {
    if max_width == 0 || text.width() <= max_width {
        return text.to_string();
    }
    let budget = max_width.saturating_sub(2);
    let mut used = 0;
    let mut result = String::new();
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        result.push(ch);
    }
    result.push_str("..");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use devices_core::{view_for_state, FieldClassification, LoadState, SchemaStrategy};
    use pretty_assertions::assert_eq;

    fn text_for(state: LoadState, max: usize) -> String {
        let view = view_for_state(
            &state,
            &FieldClassification::default(),
            SchemaStrategy::FirstRecord,
        );
        render_text(&view, max)
    }

    #[test]
    fn renders_aligned_table() {
        let devices = devices_core::decode_devices_payload(
            r#"{"devices":[{"_id":"a1","name":"fan","metadata":{"x":1}},{"_id":"b2","name":"ceiling lamp"}]}"#,
        )
        .unwrap();
        assert_eq!(
            text_for(LoadState::Ready(devices), 0),
            concat!(
                "Create: /devices/new\n",
                "\n",
                "_id                   | name         | metadata\n",
                "----------------------+--------------+---------\n",
                "a1 </devices/a1/edit> | fan          | {\"x\":1}\n",
                "b2 </devices/b2/edit> | ceiling lamp |\n",
            )
        );
    }

    #[test]
    fn truncates_wide_cells() {
        assert_eq!(truncate("abcdefghij", 6), "abcd..");
        assert_eq!(truncate("abc", 6), "abc");
        assert_eq!(truncate("abcdefghij", 0), "abcdefghij");
    }

    #[test]
    fn no_data_and_progress() {
        assert_eq!(
            text_for(LoadState::Ready(Vec::new()), 0),
            "Create: /devices/new\n\nNo devices data yet!\n"
        );
        assert_eq!(text_for(LoadState::Loading, 0), "Loading...\n");
    }
}
