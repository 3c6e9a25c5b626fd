use schemars::schema_for;
use serde_json::Value;

use crate::draft::FormDraft;
use crate::response::ResponseSubmission;
use crate::spec::form::FormDefinition;

/// Documents that have a published JSON Schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Draft,
    Form,
    Response,
}

/// JSON Schema describing `kind`.
pub fn generate(kind: SchemaKind) -> Value {
    match kind {
        SchemaKind::Draft => schema_for!(FormDraft).to_value(),
        SchemaKind::Form => schema_for!(FormDefinition).to_value(),
        SchemaKind::Response => schema_for!(ResponseSubmission).to_value(),
    }
}
