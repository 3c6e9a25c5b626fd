use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A single answer: one string, or several for multiselect fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Multiple(Vec<String>),
}

impl Default for AnswerValue {
    fn default() -> Self {
        AnswerValue::Single(String::new())
    }
}

impl AnswerValue {
    /// Blank strings and sequences holding only blanks count as unanswered.
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Single(value) => value.trim().is_empty(),
            AnswerValue::Multiple(values) => values.iter().all(|value| value.trim().is_empty()),
        }
    }

    /// Whether this answer picks `option`: equality for a single value,
    /// membership for a sequence.
    pub fn selects(&self, option: &str) -> bool {
        match self {
            AnswerValue::Single(value) => value == option,
            AnswerValue::Multiple(values) => values.iter().any(|value| value == option),
        }
    }

    /// Renders the answer as one table cell.
    pub fn to_cell(&self, delimiter: &str) -> String {
        match self {
            AnswerValue::Single(value) => value.clone(),
            AnswerValue::Multiple(values) => values.join(delimiter),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Single(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Single(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(values: Vec<String>) -> Self {
        AnswerValue::Multiple(values)
    }
}

impl<const N: usize> From<[&str; N]> for AnswerValue {
    fn from(values: [&str; N]) -> Self {
        AnswerValue::Multiple(values.iter().map(|value| value.to_string()).collect())
    }
}

/// Sub-question answers keyed by sub-question name.
pub type SubResponses = IndexMap<String, AnswerValue>;

/// Answer to one top-level field.
///
/// Deserializes from the structured `{ value, subResponses }` shape as well as
/// from a bare string, a bare array or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", from = "RawFieldAnswer")]
pub struct FieldAnswer {
    pub value: AnswerValue,
    pub sub_responses: Option<SubResponses>,
}

impl FieldAnswer {
    pub fn new(value: impl Into<AnswerValue>) -> Self {
        Self {
            value: value.into(),
            sub_responses: None,
        }
    }

    pub fn with_sub_response(
        mut self,
        name: impl Into<String>,
        value: impl Into<AnswerValue>,
    ) -> Self {
        self.sub_responses
            .get_or_insert_with(SubResponses::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn sub_response(&self, name: &str) -> Option<&AnswerValue> {
        self.sub_responses.as_ref()?.get(name)
    }
}

#[derive(Deserialize, JsonSchema)]
#[serde(untagged)]
enum RawFieldAnswer {
    Bare(AnswerValue),
    Structured {
        #[serde(default)]
        value: Option<AnswerValue>,
        #[serde(default, rename = "subResponses")]
        sub_responses: Option<SubResponses>,
    },
    Empty,
}

impl From<RawFieldAnswer> for FieldAnswer {
    fn from(raw: RawFieldAnswer) -> Self {
        match raw {
            RawFieldAnswer::Bare(value) => FieldAnswer::new(value),
            RawFieldAnswer::Structured {
                value,
                sub_responses,
            } => FieldAnswer {
                value: value.unwrap_or_default(),
                sub_responses,
            },
            RawFieldAnswer::Empty => FieldAnswer::default(),
        }
    }
}

/// Answers keyed by field name.
pub type ResponseData = IndexMap<String, FieldAnswer>;

/// Payload a respondent submits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSubmission {
    #[serde(alias = "response_data")]
    pub response_data: ResponseData,
}

/// A stored, immutable response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub id: Uuid,
    pub form_uuid: Uuid,
    pub response_data: ResponseData,
    #[serde(with = "time::serde::rfc3339")]
    #[schemars(with = "String")]
    pub submitted_at: OffsetDateTime,
}

impl ResponseRecord {
    /// Stamps `response_data` with a fresh id.
    pub fn new(
        form_uuid: Uuid,
        response_data: ResponseData,
        submitted_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            form_uuid,
            response_data,
            submitted_at,
        }
    }

    pub fn answer(&self, field: &str) -> Option<&FieldAnswer> {
        self.response_data.get(field)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn blank_values_are_empty() {
        assert!(AnswerValue::from("  ").is_empty());
        assert!(AnswerValue::Multiple(vec![]).is_empty());
        assert!(AnswerValue::from(["", " "]).is_empty());
        assert!(!AnswerValue::from(["", "a"]).is_empty());
    }

    #[test]
    fn selects_by_equality_or_membership() {
        assert!(AnswerValue::from("No").selects("No"));
        assert!(!AnswerValue::from("No ").selects("No"));
        assert!(AnswerValue::from(["a", "b"]).selects("b"));
        assert!(!AnswerValue::from(["a", "b"]).selects("c"));
    }

    #[test]
    fn normalizes_legacy_answer_shapes() {
        let data: ResponseData = serde_json::from_value(json!({
            "name": "Ada",
            "colors": ["red", "blue"],
            "skipped": null,
            "satisfaction": { "value": "No", "subResponses": { "reason": "slow" } },
            "partial": { "subResponses": null }
        }))
        .unwrap();
        assert_eq!(data["name"], FieldAnswer::new("Ada"));
        assert_eq!(data["colors"], FieldAnswer::new(["red", "blue"]));
        assert_eq!(data["skipped"], FieldAnswer::default());
        assert_eq!(
            data["satisfaction"],
            FieldAnswer::new("No").with_sub_response("reason", "slow")
        );
        assert_eq!(data["partial"], FieldAnswer::default());
    }

    #[test]
    fn serializes_uniform_shape() {
        let answer = FieldAnswer::new("Yes");
        assert_eq!(
            serde_json::to_value(&answer).unwrap(),
            json!({ "value": "Yes", "subResponses": null })
        );
    }

    #[test]
    fn submission_accepts_snake_case_key() {
        let submission: ResponseSubmission =
            serde_json::from_value(json!({ "response_data": { "name": "Ada" } })).unwrap();
        assert_eq!(submission.response_data["name"], FieldAnswer::new("Ada"));
    }
}
