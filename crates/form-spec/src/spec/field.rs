use std::fmt;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::draft::{
    DraftError, FieldDraft, clean_choice, normalize_sub_question, reject_separator,
};

/// Supported field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Dropdown,
    Multiselect,
    Image,
    Slider,
}

impl FieldKind {
    pub const ALL: [FieldKind; 5] = [
        FieldKind::Text,
        FieldKind::Dropdown,
        FieldKind::Multiselect,
        FieldKind::Image,
        FieldKind::Slider,
    ];

    /// Parses a wire type tag, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Dropdown => "dropdown",
            FieldKind::Multiselect => "multiselect",
            FieldKind::Image => "image",
            FieldKind::Slider => "slider",
        }
    }

    /// Whether fields of this kind carry an option list (and may branch).
    pub fn has_options(self) -> bool {
        matches!(self, FieldKind::Dropdown | FieldKind::Multiselect)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step configuration for slider fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SliderConfig {
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Sub-question lists keyed by the option that exposes them.
pub type SubQuestionMap = IndexMap<String, Vec<SubQuestion>>;

/// Definition of a single field inside a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub sub_questions: SubQuestionMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slider_config: Option<SliderConfig>,
}

/// A named field exposed only when its parent's value selects the owning option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SubQuestion {
    pub name: String,
    #[serde(flatten)]
    pub field: FieldDefinition,
}

impl FieldDefinition {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            options: Vec::new(),
            required: false,
            sub_questions: SubQuestionMap::new(),
            slider_config: None,
        }
    }

    /// Sub-questions attached to `option`, if any.
    pub fn branch(&self, option: &str) -> Option<&[SubQuestion]> {
        self.sub_questions.get(option).map(Vec::as_slice)
    }

    /// Looks a sub-question up by name across every branch.
    pub fn sub_question(&self, name: &str) -> Option<&SubQuestion> {
        self.sub_questions
            .values()
            .flatten()
            .find(|sub| sub.name == name)
    }

    pub fn has_sub_questions(&self) -> bool {
        self.sub_questions.values().any(|branch| !branch.is_empty())
    }

    /// Branches in option order, skipping options without a sub-question list.
    pub fn branches(&self) -> impl Iterator<Item = (&str, &[SubQuestion])> {
        self.options.iter().filter_map(|option| {
            self.sub_questions
                .get(option)
                .map(|branch| (option.as_str(), branch.as_slice()))
        })
    }

    /// Appends `value` to the options and opens an empty branch for it.
    ///
    /// Returns `Ok(false)` when the option already exists.
    pub fn add_option(&mut self, value: &str) -> Result<bool, DraftError> {
        if !self.kind.has_options() {
            return Err(DraftError::OptionsNotSupported { kind: self.kind });
        }
        let value = clean_choice(value).ok_or(DraftError::EmptyOption)?;
        reject_separator(value)?;
        if self.options.iter().any(|option| option == value) {
            return Ok(false);
        }
        self.options.push(value.to_string());
        self.sub_questions.insert(value.to_string(), Vec::new());
        Ok(true)
    }

    /// Removes `value` together with its branch.
    ///
    /// Returns `false` when the option was not present.
    pub fn remove_option(&mut self, value: &str) -> bool {
        let value = value.trim();
        let Some(idx) = self.options.iter().position(|option| option == value) else {
            return false;
        };
        self.options.remove(idx);
        self.sub_questions.shift_remove(value);
        true
    }

    /// Normalizes `draft` and appends it to the branch of `option`.
    pub fn add_sub_question(
        &mut self,
        option: &str,
        draft: &FieldDraft,
    ) -> Result<(), DraftError> {
        let option = option.trim();
        if !self.options.iter().any(|candidate| candidate == option) {
            return Err(DraftError::UnknownBranch {
                name: draft.name.trim().to_string(),
                option: option.to_string(),
            });
        }
        let sub = normalize_sub_question(draft)?;
        if self.sub_question(&sub.name).is_some() {
            return Err(DraftError::DuplicateSubQuestion { name: sub.name });
        }
        self.sub_questions
            .entry(option.to_string())
            .or_default()
            .push(sub);
        Ok(())
    }
}
