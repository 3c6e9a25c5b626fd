use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::spec::field::{FieldDefinition, SubQuestion};

/// Fields keyed by name; insertion order is display order.
pub type FieldMap = IndexMap<String, FieldDefinition>;

/// A form as created by its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub uuid: Uuid,
    pub title: String,
    pub fields: FieldMap,
    #[serde(default)]
    pub password: String,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub expiry: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    #[schemars(with = "String")]
    pub created_at: OffsetDateTime,
}

/// Reasons a viewer is refused access to a form's responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("password required to view responses")]
    PasswordRequired,
    #[error("invalid password")]
    InvalidPassword,
}

impl FormDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    /// Resolves a sub-question of `field` by name.
    pub fn sub_question(&self, field: &str, name: &str) -> Option<&SubQuestion> {
        self.field(field)?.sub_question(name)
    }

    /// A form stops accepting submissions at its expiry instant.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expiry.is_some_and(|expiry| now >= expiry)
    }

    /// Forms created without a password expose their responses to anyone.
    pub fn check_password(&self, candidate: Option<&str>) -> Result<(), AccessError> {
        if self.password.is_empty() {
            return Ok(());
        }
        match candidate {
            None | Some("") => Err(AccessError::PasswordRequired),
            Some(candidate) if candidate == self.password => Ok(()),
            Some(_) => Err(AccessError::InvalidPassword),
        }
    }
}
