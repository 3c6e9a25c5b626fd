//! Author-side drafts and their normalization into [`FormDefinition`]s.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::spec::field::{FieldDefinition, FieldKind, SliderConfig, SubQuestion, SubQuestionMap};
use crate::path::PATH_SEPARATOR;
use crate::spec::form::{FieldMap, FormDefinition};

/// Errors raised while turning drafts into definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("form title must not be empty")]
    EmptyTitle,
    #[error("form must define at least one field")]
    NoFields,
    #[error("field name must not be empty")]
    EmptyName,
    #[error("field '{name}' has unrecognized type '{kind}'")]
    UnknownType { name: String, kind: String },
    #[error("field '{name}' of type {kind} needs at least one option")]
    MissingOptions { name: String, kind: FieldKind },
    #[error("sub-questions of '{name}' are keyed by '{option}', which is not one of its options")]
    UnknownBranch { name: String, option: String },
    #[error("sub-question '{name}' may not define sub-questions of its own")]
    NestedSubQuestions { name: String },
    #[error("duplicate field name '{0}'")]
    DuplicateField(String),
    #[error("sub-question '{name}' is declared more than once")]
    DuplicateSubQuestion { name: String },
    #[error("slider field '{name}' needs at least one step")]
    MissingSliderSteps { name: String },
    #[error("slider field '{name}' default '{value}' is not one of its steps")]
    InvalidSliderDefault { name: String, value: String },
    #[error("fields of type {kind} do not take options")]
    OptionsNotSupported { kind: FieldKind },
    #[error("option value must not be empty")]
    EmptyOption,
    #[error("'{0}' must not contain the path separator '{sep}'", sep = PATH_SEPARATOR)]
    ReservedSeparator(String),
    #[error("default expiry of {ttl} from {now} is out of range")]
    ExpiryOutOfRange { now: OffsetDateTime, ttl: Duration },
}

fn default_kind() -> String {
    FieldKind::Text.as_str().to_string()
}

/// A field as typed by the author; loosely typed until normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDraft {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub sub_questions: IndexMap<String, Vec<FieldDraft>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slider_config: Option<SliderConfig>,
}

impl FieldDraft {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind: kind.as_str().to_string(),
            options: Vec::new(),
            required: false,
            sub_questions: IndexMap::new(),
            slider_config: None,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_branch(mut self, option: impl Into<String>, subs: Vec<FieldDraft>) -> Self {
        self.sub_questions.insert(option.into(), subs);
        self
    }

    pub fn with_steps<I, S>(mut self, steps: I, default_value: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slider_config = Some(SliderConfig {
            steps: steps.into_iter().map(Into::into).collect(),
            default_value: default_value.map(str::to_string),
        });
        self
    }
}

/// A whole form as submitted by its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormDraft {
    pub title: String,
    #[serde(deserialize_with = "deserialize_fields")]
    #[schemars(with = "Vec<FieldDraft>")]
    pub fields: Vec<FieldDraft>,
    #[serde(default)]
    pub password: String,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub expiry: Option<OffsetDateTime>,
}

impl FormDraft {
    pub fn new(title: impl Into<String>, fields: Vec<FieldDraft>) -> Self {
        Self {
            title: title.into(),
            fields,
            password: String::new(),
            expiry: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_expiry(mut self, expiry: OffsetDateTime) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Normalizes every field into a fresh [`FormDefinition`].
    ///
    /// A draft without an expiry gets `now + default_ttl`; a `None` ttl leaves
    /// the form open indefinitely.
    pub fn build(
        &self,
        now: OffsetDateTime,
        default_ttl: Option<Duration>,
    ) -> Result<FormDefinition, DraftError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        if self.fields.is_empty() {
            return Err(DraftError::NoFields);
        }

        let mut fields = FieldMap::with_capacity(self.fields.len());
        for draft in &self.fields {
            let (name, definition) = normalize(draft)?;
            if fields.contains_key(&name) {
                return Err(DraftError::DuplicateField(name));
            }
            fields.insert(name, definition);
        }

        let expiry = match (self.expiry, default_ttl) {
            (Some(expiry), _) => Some(expiry),
            (None, Some(ttl)) => Some(
                now.checked_add(ttl)
                    .ok_or(DraftError::ExpiryOutOfRange { now, ttl })?,
            ),
            (None, None) => None,
        };
        let form = FormDefinition {
            uuid: Uuid::new_v4(),
            title: title.to_string(),
            fields,
            password: self.password.clone(),
            expiry,
            created_at: now,
        };
        debug!(uuid = %form.uuid, fields = form.fields.len(), "normalized form draft");
        Ok(form)
    }
}

/// Normalizes a top-level field draft into its name and definition.
pub fn normalize(draft: &FieldDraft) -> Result<(String, FieldDefinition), DraftError> {
    let name = clean_name(&draft.name)?;
    let definition = normalize_definition(name, draft, true)?;
    Ok((name.to_string(), definition))
}

/// Normalizes a draft that lives inside another field's branch.
pub fn normalize_sub_question(draft: &FieldDraft) -> Result<SubQuestion, DraftError> {
    let name = clean_name(&draft.name)?;
    let field = normalize_definition(name, draft, false)?;
    Ok(SubQuestion {
        name: name.to_string(),
        field,
    })
}

fn clean_name(raw: &str) -> Result<&str, DraftError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DraftError::EmptyName);
    }
    reject_separator(name)?;
    Ok(name)
}

/// Names and options end up joined into export headers.
pub(crate) fn reject_separator(value: &str) -> Result<(), DraftError> {
    if value.contains(PATH_SEPARATOR) {
        return Err(DraftError::ReservedSeparator(value.to_string()));
    }
    Ok(())
}

/// Trims an option or step value; blank values yield `None`.
pub(crate) fn clean_choice(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn normalize_definition(
    name: &str,
    draft: &FieldDraft,
    allow_branches: bool,
) -> Result<FieldDefinition, DraftError> {
    let kind = FieldKind::parse(&draft.kind).ok_or_else(|| DraftError::UnknownType {
        name: name.to_string(),
        kind: draft.kind.clone(),
    })?;
    if !allow_branches && draft.sub_questions.values().any(|subs| !subs.is_empty()) {
        return Err(DraftError::NestedSubQuestions {
            name: name.to_string(),
        });
    }

    let mut definition = FieldDefinition::new(kind);
    definition.required = draft.required;
    match kind {
        FieldKind::Dropdown | FieldKind::Multiselect => {
            definition.options = distinct_choices(&draft.options);
            definition
                .options
                .iter()
                .try_for_each(|option| reject_separator(option))?;
            if definition.options.is_empty() {
                return Err(DraftError::MissingOptions {
                    name: name.to_string(),
                    kind,
                });
            }
            definition.sub_questions =
                normalize_branches(name, &definition.options, &draft.sub_questions)?;
        }
        FieldKind::Slider => {
            let config = normalize_slider(name, draft.slider_config.as_ref())?;
            definition.slider_config = Some(config);
        }
        FieldKind::Text | FieldKind::Image => {}
    }
    Ok(definition)
}

fn distinct_choices(raw: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    raw.iter()
        .filter_map(|value| clean_choice(value))
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

fn normalize_branches(
    name: &str,
    options: &[String],
    drafts: &IndexMap<String, Vec<FieldDraft>>,
) -> Result<SubQuestionMap, DraftError> {
    let mut keyed: IndexMap<&str, Vec<SubQuestion>> = IndexMap::new();
    let mut seen = BTreeSet::new();
    for (option, subs) in drafts {
        let option = option.trim();
        if !options.iter().any(|candidate| candidate == option) {
            return Err(DraftError::UnknownBranch {
                name: name.to_string(),
                option: option.to_string(),
            });
        }
        let branch = keyed.entry(option).or_default();
        for sub in subs {
            let sub = normalize_sub_question(sub)?;
            if !seen.insert(sub.name.clone()) {
                return Err(DraftError::DuplicateSubQuestion { name: sub.name });
            }
            branch.push(sub);
        }
    }

    let mut branches = SubQuestionMap::new();
    for option in options {
        if let Some(subs) = keyed.shift_remove(option.as_str()) {
            branches.insert(option.clone(), subs);
        }
    }
    Ok(branches)
}

fn normalize_slider(
    name: &str,
    config: Option<&SliderConfig>,
) -> Result<SliderConfig, DraftError> {
    let steps = config
        .map(|config| distinct_choices(&config.steps))
        .unwrap_or_default();
    let Some(first) = steps.first().cloned() else {
        return Err(DraftError::MissingSliderSteps {
            name: name.to_string(),
        });
    };
    let default_value = match config
        .and_then(|config| config.default_value.as_deref())
        .and_then(clean_choice)
    {
        Some(value) if steps.iter().any(|step| step == value) => value.to_string(),
        Some(value) => {
            return Err(DraftError::InvalidSliderDefault {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
        None => first,
    };
    Ok(SliderConfig {
        steps,
        default_value: Some(default_value),
    })
}

/// Field entries keyed by name: a full draft, a bare option list (dropdown)
/// or `null` (text).
#[derive(Deserialize)]
#[serde(untagged)]
enum KeyedField {
    Options(Vec<String>),
    Draft(FieldDraft),
    Text,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldList {
    Ordered(Vec<FieldDraft>),
    Keyed(IndexMap<String, KeyedField>),
}

fn deserialize_fields<'de, D>(deserializer: D) -> Result<Vec<FieldDraft>, D::Error>
where
    D: Deserializer<'de>,
{
    let fields = match FieldList::deserialize(deserializer)? {
        FieldList::Ordered(fields) => fields,
        FieldList::Keyed(map) => map
            .into_iter()
            .map(|(name, entry)| match entry {
                KeyedField::Options(options) => {
                    FieldDraft::new(name, FieldKind::Dropdown).with_options(options)
                }
                KeyedField::Draft(mut draft) => {
                    draft.name = name;
                    draft
                }
                KeyedField::Text => FieldDraft::new(name, FieldKind::Text),
            })
            .collect(),
    };
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn now() -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH
    }

    #[test]
    fn rejects_blank_names() {
        let err = normalize(&FieldDraft::new("  ", FieldKind::Text)).unwrap_err();
        assert_eq!(err, DraftError::EmptyName);
    }

    #[test]
    fn rejects_unknown_types() {
        let mut draft = FieldDraft::new("age", FieldKind::Text);
        draft.kind = "number".into();
        assert_eq!(
            normalize(&draft).unwrap_err(),
            DraftError::UnknownType {
                name: "age".into(),
                kind: "number".into()
            }
        );
    }

    #[test]
    fn choice_fields_need_options() {
        let draft = FieldDraft::new("color", FieldKind::Multiselect).with_options(["", "  "]);
        assert!(matches!(
            normalize(&draft),
            Err(DraftError::MissingOptions { .. })
        ));
    }

    #[test]
    fn options_are_trimmed_and_deduplicated() {
        let draft = FieldDraft::new(" color ", FieldKind::Dropdown)
            .with_options([" red", "blue ", "red", ""]);
        let (name, field) = normalize(&draft).unwrap();
        assert_eq!(name, "color");
        assert_eq!(field.options, vec!["red", "blue"]);
    }

    #[test]
    fn non_choice_fields_drop_options_and_branches() {
        let draft = FieldDraft::new("photo", FieldKind::Image)
            .with_options(["a", "b"])
            .with_branch("a", vec![FieldDraft::new("why", FieldKind::Text)]);
        let (_, field) = normalize(&draft).unwrap();
        assert!(field.options.is_empty());
        assert!(field.sub_questions.is_empty());
    }

    #[test]
    fn branches_must_key_existing_options() {
        let draft = FieldDraft::new("ok", FieldKind::Dropdown)
            .with_options(["Yes", "No"])
            .with_branch("Maybe", vec![FieldDraft::new("why", FieldKind::Text)]);
        assert_eq!(
            normalize(&draft).unwrap_err(),
            DraftError::UnknownBranch {
                name: "ok".into(),
                option: "Maybe".into()
            }
        );
    }

    #[test]
    fn branches_follow_option_order() {
        let draft = FieldDraft::new("ok", FieldKind::Dropdown)
            .with_options(["Yes", "No"])
            .with_branch("No", vec![FieldDraft::new("why", FieldKind::Text)])
            .with_branch("Yes", vec![FieldDraft::new("what", FieldKind::Text)]);
        let (_, field) = normalize(&draft).unwrap();
        let keys: Vec<_> = field.sub_questions.keys().cloned().collect();
        assert_eq!(keys, vec!["Yes", "No"]);
    }

    #[test]
    fn sub_questions_cannot_nest() {
        let nested = FieldDraft::new("why", FieldKind::Dropdown)
            .with_options(["a"])
            .with_branch("a", vec![FieldDraft::new("deeper", FieldKind::Text)]);
        let draft = FieldDraft::new("ok", FieldKind::Dropdown)
            .with_options(["No"])
            .with_branch("No", vec![nested]);
        assert_eq!(
            normalize(&draft).unwrap_err(),
            DraftError::NestedSubQuestions { name: "why".into() }
        );
    }

    #[test]
    fn slider_defaults_to_first_step() {
        let draft =
            FieldDraft::new("mood", FieldKind::Slider).with_steps(["low", "mid", "high"], None);
        let (_, field) = normalize(&draft).unwrap();
        let config = field.slider_config.unwrap();
        assert_eq!(config.default_value.as_deref(), Some("low"));
    }

    #[test]
    fn slider_default_must_be_a_step() {
        let draft =
            FieldDraft::new("mood", FieldKind::Slider).with_steps(["low", "high"], Some("mid"));
        assert!(matches!(
            normalize(&draft),
            Err(DraftError::InvalidSliderDefault { .. })
        ));
        let empty = FieldDraft::new("mood", FieldKind::Slider);
        assert!(matches!(
            normalize(&empty),
            Err(DraftError::MissingSliderSteps { .. })
        ));
    }

    #[test]
    fn build_rejects_duplicate_names() {
        let draft = FormDraft::new(
            "Survey",
            vec![
                FieldDraft::new("name", FieldKind::Text),
                FieldDraft::new(" name", FieldKind::Text),
            ],
        );
        assert_eq!(
            draft.build(now(), None).unwrap_err(),
            DraftError::DuplicateField("name".into())
        );
    }

    #[test]
    fn build_applies_default_expiry() {
        let draft = FormDraft::new("Survey", vec![FieldDraft::new("name", FieldKind::Text)]);
        let form = draft.build(now(), Some(Duration::hours(24))).unwrap();
        assert_eq!(form.expiry, Some(now() + Duration::hours(24)));
        assert_eq!(form.created_at, now());

        let explicit = draft
            .clone()
            .with_expiry(now() + Duration::hours(1))
            .build(now(), Some(Duration::hours(24)))
            .unwrap();
        assert_eq!(explicit.expiry, Some(now() + Duration::hours(1)));
        assert_eq!(draft.build(now(), None).unwrap().expiry, None);
    }

    #[test]
    fn build_rejects_unrepresentable_default_expiry() {
        let draft = FormDraft::new("Survey", vec![FieldDraft::new("name", FieldKind::Text)]);
        let ttl = Duration::hours(i64::from(u32::MAX));
        assert_eq!(
            draft.build(now(), Some(ttl)).unwrap_err(),
            DraftError::ExpiryOutOfRange { now: now(), ttl }
        );

        let explicit = draft.with_expiry(now()).build(now(), Some(ttl)).unwrap();
        assert_eq!(explicit.expiry, Some(now()));
    }

    #[test]
    fn names_and_options_cannot_hold_the_separator() {
        let field = FieldDraft::new("a > b > c", FieldKind::Text);
        assert_eq!(
            normalize(&field).unwrap_err(),
            DraftError::ReservedSeparator("a > b > c".into())
        );

        let sub = FieldDraft::new("a", FieldKind::Dropdown)
            .with_options(["b"])
            .with_branch("b", vec![FieldDraft::new("c > d", FieldKind::Text)]);
        assert_eq!(
            normalize(&sub).unwrap_err(),
            DraftError::ReservedSeparator("c > d".into())
        );

        let option = FieldDraft::new("a", FieldKind::Multiselect).with_options(["b > c"]);
        assert_eq!(
            normalize(&option).unwrap_err(),
            DraftError::ReservedSeparator("b > c".into())
        );

        let plain = FieldDraft::new("a>b", FieldKind::Text);
        assert!(normalize(&plain).is_ok());
    }

    #[test]
    fn build_requires_title_and_fields() {
        let draft = FormDraft::new(" ", vec![FieldDraft::new("name", FieldKind::Text)]);
        assert_eq!(draft.build(now(), None).unwrap_err(), DraftError::EmptyTitle);
        let draft = FormDraft::new("Survey", vec![]);
        assert_eq!(draft.build(now(), None).unwrap_err(), DraftError::NoFields);
    }

    #[test]
    fn accepts_legacy_field_maps() {
        let draft: FormDraft = serde_json::from_str(
            r#"{
                "title": "Legacy",
                "fields": { "name": null, "color": ["red", "blue"] },
                "password": "pw"
            }"#,
        )
        .unwrap();
        assert_eq!(draft.fields[0], FieldDraft::new("name", FieldKind::Text));
        assert_eq!(
            draft.fields[1],
            FieldDraft::new("color", FieldKind::Dropdown).with_options(["red", "blue"])
        );
    }

    #[test]
    fn accepts_keyed_field_definitions() {
        let draft: FormDraft = serde_json::from_value(json!({
            "title": "Keyed",
            "fields": {
                "satisfaction": {
                    "type": "dropdown",
                    "options": ["Yes", "No"],
                    "required": true,
                    "subQuestions": { "No": [{ "name": "reason", "type": "text" }] }
                }
            }
        }))
        .unwrap();
        let form = draft.build(now(), None).unwrap();
        let field = form.field("satisfaction").unwrap();
        assert!(field.required);
        assert_eq!(field.branch("No").unwrap()[0].name, "reason");
    }
}
