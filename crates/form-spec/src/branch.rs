use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::response::AnswerValue;
use crate::spec::field::{FieldDefinition, SubQuestion};

/// Which sub-questions of a selected branch must be answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BranchPolicy {
    /// Every sub-question of a selected branch, whatever its own `required` flag.
    #[default]
    AllSubQuestions,
    /// Only sub-questions flagged `required`.
    RequiredOnly,
}

impl BranchPolicy {
    pub fn demands(self, sub: &SubQuestion) -> bool {
        match self {
            BranchPolicy::AllSubQuestions => true,
            BranchPolicy::RequiredOnly => sub.field.required,
        }
    }
}

/// Branches of `field` that `value` selects, in option order.
pub fn selected_branches<'a>(
    field: &'a FieldDefinition,
    value: &'a AnswerValue,
) -> impl Iterator<Item = (&'a str, &'a [SubQuestion])> + 'a {
    field
        .branches()
        .filter(move |(option, _)| value.selects(option))
}

/// Whether `value` exposes the branch keyed by `option`.
pub fn is_selected(field: &FieldDefinition, value: &AnswerValue, option: &str) -> bool {
    field.branch(option).is_some() && value.selects(option)
}
