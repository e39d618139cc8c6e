//! Plain-text rendering of the visible page.

use std::fmt::Write;

use datagrid::DataTable;
use unicode_width::UnicodeWidthStr;

const LOADING: &str = "...";

/// Renders the chunk of `table` as an aligned text table with a footer.
pub fn render(table: &DataTable) -> String {
    let columns: Vec<_> = table.visible_columns().collect();
    let rows = table.visible_rows();

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|visible| {
            columns
                .iter()
                .map(|column| match visible.row {
                    Some(row) => column.get_value_view(row).to_text(),
                    None => LOADING.to_string(),
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].width())
                .chain([column.title().width()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<&str> = columns.iter().map(|c| c.title()).collect();
    push_line(&mut out, header.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in &cells {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }

    let pager = table.pager();
    let range = table.chunk();
    let _ = writeln!(
        out,
        "\npage {}/{} | rows {}-{} of {}",
        pager.current(),
        pager.total_pages(),
        if range.is_empty() { 0 } else { range.start + 1 },
        range.end,
        table.total()
    );
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell}{}", " ".repeat(width.saturating_sub(cell.width()))))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}
