use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

use crate::branch::{BranchPolicy, selected_branches};
use crate::path::{FieldPath, join_paths};
use crate::response::ResponseData;
use crate::spec::form::FormDefinition;

/// Inputs that are not part of the form or the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    pub now: OffsetDateTime,
    pub branch_policy: BranchPolicy,
}

impl ValidationOptions {
    pub fn at(now: OffsetDateTime) -> Self {
        Self {
            now,
            branch_policy: BranchPolicy::default(),
        }
    }

    pub fn with_branch_policy(mut self, branch_policy: BranchPolicy) -> Self {
        self.branch_policy = branch_policy;
        self
    }
}

/// Reasons a candidate response is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("form expired at {expired_at}")]
    FormExpired { expired_at: OffsetDateTime },
    #[error("response references unknown fields: {}", join_paths(.0))]
    UnknownFieldReference(Vec<FieldPath>),
    #[error("missing required fields: {}", join_paths(.0))]
    MissingRequiredFields(Vec<FieldPath>),
}

impl SubmissionError {
    /// Paths the respondent has to revisit; empty for expired forms.
    pub fn paths(&self) -> &[FieldPath] {
        match self {
            SubmissionError::FormExpired { .. } => &[],
            SubmissionError::UnknownFieldReference(paths)
            | SubmissionError::MissingRequiredFields(paths) => paths,
        }
    }

    /// Missing answers can be fixed by re-prompting; the other cases cannot.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SubmissionError::MissingRequiredFields(_))
    }
}

/// Checks `data` against `form`: expiry first, then field references, then
/// required fields and selected branches.
pub fn validate(
    form: &FormDefinition,
    data: &ResponseData,
    options: &ValidationOptions,
) -> Result<(), SubmissionError> {
    if let Some(expired_at) = form.expiry
        && form.is_expired(options.now)
    {
        debug!(uuid = %form.uuid, %expired_at, "rejecting response for expired form");
        return Err(SubmissionError::FormExpired { expired_at });
    }

    let unknown = unknown_references(form, data);
    if !unknown.is_empty() {
        debug!(uuid = %form.uuid, count = unknown.len(), "response references unknown fields");
        return Err(SubmissionError::UnknownFieldReference(unknown));
    }

    let missing = missing_paths(form, data, options.branch_policy);
    if !missing.is_empty() {
        debug!(uuid = %form.uuid, count = missing.len(), "response is missing answers");
        return Err(SubmissionError::MissingRequiredFields(missing));
    }

    Ok(())
}

/// Every unanswered required field and every unanswered sub-question of a
/// selected branch, in form order.
pub fn missing_paths(
    form: &FormDefinition,
    data: &ResponseData,
    policy: BranchPolicy,
) -> Vec<FieldPath> {
    let mut missing = Vec::new();

    for (name, field) in &form.fields {
        let Some(answer) = data.get(name).filter(|answer| !answer.value.is_empty()) else {
            if field.required {
                missing.push(FieldPath::field(name));
            }
            continue;
        };

        for (_, branch) in selected_branches(field, &answer.value) {
            for sub in branch.iter().filter(|sub| policy.demands(sub)) {
                let answered = answer
                    .sub_response(&sub.name)
                    .is_some_and(|value| !value.is_empty());
                if !answered {
                    missing.push(FieldPath::sub_question(name, &sub.name));
                }
            }
        }
    }

    missing
}

/// Answers and sub-answers that do not match anything in `form`, in response order.
pub fn unknown_references(form: &FormDefinition, data: &ResponseData) -> Vec<FieldPath> {
    let mut unknown = Vec::new();

    for (name, answer) in data {
        let Some(field) = form.field(name) else {
            unknown.push(FieldPath::field(name));
            continue;
        };
        let Some(sub_responses) = &answer.sub_responses else {
            continue;
        };
        unknown.extend(
            sub_responses
                .keys()
                .filter(|sub| field.sub_question(sub).is_none())
                .map(|sub| FieldPath::sub_question(name, sub)),
        );
    }

    unknown
}
