//! Flattening of response records into a rectangular table.

mod csv;
mod excel;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::branch::is_selected;
use crate::path::PATH_SEPARATOR;
use crate::response::ResponseRecord;
use crate::spec::form::FormDefinition;

pub use self::csv::{escape_csv_cell, render_csv};
pub use self::excel::{escape_xml, render_excel_xml};

/// Delimiter placed between the values of a multiselect answer.
pub const MULTI_VALUE_DELIMITER: &str = "; ";

/// Errors raised while rendering an export.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error(
        "cell at row {row}, column {column} holds U+{code_point:04X}, which XML 1.0 cannot carry"
    )]
    Encoding {
        row: usize,
        column: usize,
        code_point: u32,
    },
}

/// Tabular view of a form's responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Supported download formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Excel,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xls",
        }
    }

    pub fn render(self, table: &ExportTable) -> Result<String, ExportError> {
        match self {
            ExportFormat::Csv => Ok(render_csv(table)),
            ExportFormat::Excel => render_excel_xml(table),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
        })
    }
}

enum Column<'a> {
    Field {
        name: &'a str,
    },
    SubQuestion {
        field: &'a str,
        option: &'a str,
        name: &'a str,
    },
}

impl Column<'_> {
    fn header(&self) -> String {
        match self {
            Column::Field { name } => (*name).to_string(),
            Column::SubQuestion {
                field,
                option,
                name,
            } => [*field, *option, *name].join(PATH_SEPARATOR),
        }
    }

    fn cell(&self, form: &FormDefinition, record: &ResponseRecord) -> String {
        match self {
            Column::Field { name } => record
                .answer(name)
                .map(|answer| answer.value.to_cell(MULTI_VALUE_DELIMITER))
                .unwrap_or_default(),
            Column::SubQuestion {
                field,
                option,
                name,
            } => {
                let (Some(definition), Some(answer)) = (form.field(field), record.answer(field))
                else {
                    return String::new();
                };
                if !is_selected(definition, &answer.value, option) {
                    return String::new();
                }
                answer
                    .sub_response(name)
                    .map(|value| value.to_cell(MULTI_VALUE_DELIMITER))
                    .unwrap_or_default()
            }
        }
    }
}

fn columns(form: &FormDefinition) -> Vec<Column<'_>> {
    let mut columns = Vec::new();
    for (field, definition) in &form.fields {
        columns.push(Column::Field { name: field });
        for (option, branch) in definition.branches() {
            columns.extend(branch.iter().map(|sub| Column::SubQuestion {
                field,
                option,
                name: &sub.name,
            }));
        }
    }
    columns
}

/// Header sequence for `form`: each field followed by its sub-question columns.
pub fn headers(form: &FormDefinition) -> Vec<String> {
    columns(form).iter().map(Column::header).collect()
}

/// Flattens `responses` into one row per record, one cell per header.
///
/// A sub-question cell stays empty unless the record's top-level value selects
/// that sub-question's option.
pub fn build_table(form: &FormDefinition, responses: &[ResponseRecord]) -> ExportTable {
    let columns = columns(form);
    let rows = responses
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| column.cell(form, record))
                .collect()
        })
        .collect::<Vec<Vec<String>>>();
    trace!(uuid = %form.uuid, columns = columns.len(), rows = rows.len(), "built export table");
    ExportTable {
        title: form.title.clone(),
        headers: columns.iter().map(Column::header).collect(),
        rows,
    }
}
