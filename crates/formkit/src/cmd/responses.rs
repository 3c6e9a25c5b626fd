use std::fmt::Write as _;

use anyhow::Result;
use clap::Args;
use form_spec::{MULTI_VALUE_DELIMITER, PATH_SEPARATOR, ResponsesView};
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::cmd::{Session, print_json};

#[derive(Args, Debug)]
pub struct ResponsesArgs {
    #[arg(value_name = "UUID")]
    pub form: Uuid,
    /// Password set when the form was created
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ResponsesArgs, session: &Session) -> Result<()> {
    let view = session
        .desk()?
        .responses(args.form, args.password.as_deref())?;
    if args.json {
        print_json(&view)
    } else {
        print!("{}", summarize(&view)?);
        Ok(())
    }
}

/// One block per response, answers in the order they were given.
pub fn summarize(view: &ResponsesView) -> Result<String> {
    let mut out = format!("{}: {} response(s)\n", view.title, view.responses.len());
    for record in &view.responses {
        let _ = writeln!(
            out,
            "\n{} at {}",
            record.id,
            record.submitted_at.format(&Rfc3339)?
        );
        for (name, answer) in &record.response_data {
            let value = answer.value.to_cell(MULTI_VALUE_DELIMITER);
            let _ = writeln!(out, "  {name}: {value}");
            for (sub, value) in answer.sub_responses.iter().flatten() {
                let value = value.to_cell(MULTI_VALUE_DELIMITER);
                let _ = writeln!(out, "  {name}{PATH_SEPARATOR}{sub}: {value}");
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use form_spec::{
        FieldAnswer, FieldDraft, FieldKind, FormDraft, ResponseData, ResponseRecord,
    };
    use time::OffsetDateTime;

    use super::*;

    #[test]
    fn summary_shows_sub_answers() {
        let form = FormDraft::new(
            "Feedback",
            vec![
                FieldDraft::new("satisfaction", FieldKind::Dropdown)
                    .with_options(["Yes", "No"])
                    .with_branch("No", vec![FieldDraft::new("reason", FieldKind::Text)]),
            ],
        )
        .build(OffsetDateTime::UNIX_EPOCH, None)
        .unwrap();
        let mut data = ResponseData::new();
        data.insert(
            "satisfaction".into(),
            FieldAnswer::new("No").with_sub_response("reason", "slow"),
        );
        let record = ResponseRecord::new(form.uuid, data, OffsetDateTime::UNIX_EPOCH);
        let summary = summarize(&ResponsesView::new(&form, vec![record])).unwrap();
        assert!(summary.starts_with("Feedback: 1 response(s)\n"));
        assert!(summary.contains("at 1970-01-01T00:00:00Z\n"));
        assert!(summary.contains("  satisfaction: No\n  satisfaction > reason: slow\n"));
    }
}
