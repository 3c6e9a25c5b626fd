use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::response::ResponseRecord;
use crate::spec::form::{FieldMap, FormDefinition};

/// What respondents see: the form minus its password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicForm {
    pub uuid: Uuid,
    pub title: String,
    pub fields: FieldMap,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub expiry: Option<OffsetDateTime>,
}

impl From<&FormDefinition> for PublicForm {
    fn from(form: &FormDefinition) -> Self {
        Self {
            uuid: form.uuid,
            title: form.title.clone(),
            fields: form.fields.clone(),
            expiry: form.expiry,
        }
    }
}

/// What an authorized viewer receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResponsesView {
    pub title: String,
    pub fields: FieldMap,
    pub responses: Vec<ResponseRecord>,
}

impl ResponsesView {
    pub fn new(form: &FormDefinition, responses: Vec<ResponseRecord>) -> Self {
        Self {
            title: form.title.clone(),
            fields: form.fields.clone(),
            responses,
        }
    }
}
