use std::borrow::Cow;

use super::ExportTable;

const SEPARATOR: char = ',';
const LINE_END: &str = "\r\n";

/// Quotes `cell` when it holds a separator, a quote or a line break,
/// doubling any embedded quotes.
pub fn escape_csv_cell(cell: &str) -> Cow<'_, str> {
    if cell.contains([SEPARATOR, '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}

fn push_row<'a>(out: &mut String, cells: impl IntoIterator<Item = &'a str>) {
    for (idx, cell) in cells.into_iter().enumerate() {
        if idx > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(&escape_csv_cell(cell));
    }
    out.push_str(LINE_END);
}

/// Renders `table` as RFC 4180 CSV, preceded by a title row.
pub fn render_csv(table: &ExportTable) -> String {
    let mut out = String::new();
    push_row(&mut out, [table.title.as_str()]);
    push_row(&mut out, table.headers.iter().map(String::as_str));
    for row in &table.rows {
        push_row(&mut out, row.iter().map(String::as_str));
    }
    out
}
