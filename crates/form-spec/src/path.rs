use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Separator used in rendered field paths and export headers.
pub const PATH_SEPARATOR: &str = " > ";

/// Address of a field or of one of its sub-questions, rendered as
/// `field` or `field > subQuestion`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct FieldPath {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_question: Option<String>,
}

impl FieldPath {
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            field: name.into(),
            sub_question: None,
        }
    }

    pub fn sub_question(field: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            sub_question: Some(name.into()),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub_question {
            Some(sub) => write!(f, "{}{PATH_SEPARATOR}{}", self.field, sub),
            None => f.write_str(&self.field),
        }
    }
}

pub(crate) fn join_paths(paths: &[FieldPath]) -> String {
    paths
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
