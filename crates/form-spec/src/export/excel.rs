use quick_xml::escape::escape;

use super::{ExportError, ExportTable};

const WORKBOOK_HEAD: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<?mso-application progid=\"Excel.Sheet\"?>\n",
    "<Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\"",
    " xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\">\n",
    " <Worksheet ss:Name=\"Responses\">\n",
    "  <Table>\n",
);

const WORKBOOK_TAIL: &str = "  </Table>\n </Worksheet>\n</Workbook>\n";

/// Entity-escapes `value` for XML character data.
///
/// Line breaks become character references so they survive inside a cell.
/// `row` and `column` only locate the failure when `value` holds a character
/// XML 1.0 cannot represent.
pub fn escape_xml(value: &str, row: usize, column: usize) -> Result<String, ExportError> {
    if let Some(ch) = value.chars().find(|&ch| !is_xml_char(ch)) {
        return Err(ExportError::Encoding {
            row,
            column,
            code_point: ch as u32,
        });
    }
    Ok(escape(value).replace('\r', "&#13;").replace('\n', "&#10;"))
}

fn is_xml_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r') || (ch >= ' ' && ch != '\u{FFFE}' && ch != '\u{FFFF}')
}

fn push_row<'a>(
    out: &mut String,
    row: usize,
    cells: impl IntoIterator<Item = &'a str>,
) -> Result<(), ExportError> {
    out.push_str("   <Row>");
    for (column, cell) in cells.into_iter().enumerate() {
        out.push_str("<Cell><Data ss:Type=\"String\">");
        out.push_str(&escape_xml(cell, row, column)?);
        out.push_str("</Data></Cell>");
    }
    out.push_str("</Row>\n");
    Ok(())
}

/// Renders `table` as an Excel 2003 XML (SpreadsheetML) workbook.
///
/// Row 0 holds the title, row 1 the headers, data starts at row 2.
pub fn render_excel_xml(table: &ExportTable) -> Result<String, ExportError> {
    let mut out = String::from(WORKBOOK_HEAD);
    push_row(&mut out, 0, [table.title.as_str()])?;
    push_row(&mut out, 1, table.headers.iter().map(String::as_str))?;
    for (idx, row) in table.rows.iter().enumerate() {
        push_row(&mut out, idx + 2, row.iter().map(String::as_str))?;
    }
    out.push_str(WORKBOOK_TAIL);
    Ok(out)
}
