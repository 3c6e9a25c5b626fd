#![allow(missing_docs)]

pub mod branch;
pub mod draft;
pub mod export;
pub mod path;
pub mod response;
pub mod schema;
pub mod spec;
pub mod validate;
pub mod view;

pub use branch::{BranchPolicy, is_selected, selected_branches};
pub use draft::{DraftError, FieldDraft, FormDraft, normalize, normalize_sub_question};
pub use export::{
    ExportError, ExportFormat, ExportTable, MULTI_VALUE_DELIMITER, build_table, headers,
    render_csv, render_excel_xml,
};
pub use path::{FieldPath, PATH_SEPARATOR};
pub use response::{
    AnswerValue, FieldAnswer, ResponseData, ResponseRecord, ResponseSubmission, SubResponses,
};
pub use schema::{SchemaKind, generate as json_schema};
pub use spec::{
    AccessError, FieldDefinition, FieldKind, FieldMap, FormDefinition, SliderConfig, SubQuestion,
};
pub use validate::{SubmissionError, ValidationOptions, missing_paths, unknown_references, validate};
pub use view::{PublicForm, ResponsesView};
