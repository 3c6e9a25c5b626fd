use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use form_spec::{FieldDefinition, FormDraft, PublicForm};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::cmd::{Session, print_json, read_json};

#[derive(Subcommand, Debug)]
pub enum FormCommand {
    /// Normalize a draft and store it as a new form
    Create(CreateArgs),
    /// Normalize a draft and print the result without storing it
    Check(CheckArgs),
    /// Show a form the way respondents see it
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(value_name = "draft.json")]
    pub draft: PathBuf,
    /// Print the created form as JSON instead of its uuid
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[arg(value_name = "draft.json")]
    pub draft: PathBuf,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[arg(value_name = "UUID")]
    pub form: Uuid,
    #[arg(long)]
    pub json: bool,
}

pub fn run(command: FormCommand, session: &Session) -> Result<()> {
    match command {
        FormCommand::Create(args) => create(args, session),
        FormCommand::Check(args) => check(args, session),
        FormCommand::Show(args) => show(args, session),
    }
}

fn create(args: CreateArgs, session: &Session) -> Result<()> {
    let draft: FormDraft = read_json(&args.draft)?;
    let form = session
        .desk()?
        .create(&draft, OffsetDateTime::now_utc())
        .with_context(|| format!("failed to create form from {}", args.draft.display()))?;
    if args.json {
        print_json(&PublicForm::from(&form))
    } else {
        println!("{}", form.uuid);
        Ok(())
    }
}

fn check(args: CheckArgs, session: &Session) -> Result<()> {
    let draft: FormDraft = read_json(&args.draft)?;
    let ttl = session.config().desk_settings().default_expiry;
    let form = draft
        .build(OffsetDateTime::now_utc(), ttl)
        .with_context(|| format!("{} is not a valid form draft", args.draft.display()))?;
    print_json(&form)
}

fn show(args: ShowArgs, session: &Session) -> Result<()> {
    let form = session.desk()?.public_form(args.form)?;
    if args.json {
        print_json(&form)
    } else {
        print!("{}", describe(&form)?);
        Ok(())
    }
}

fn describe_field(out: &mut String, indent: &str, name: &str, field: &FieldDefinition) {
    let flag = if field.required { ", required" } else { "" };
    let _ = writeln!(out, "{indent}{name} ({}{flag})", field.kind);
    if !field.options.is_empty() {
        let _ = writeln!(out, "{indent}  options: {}", field.options.join(", "));
    }
    if let Some(slider) = &field.slider_config {
        let _ = writeln!(out, "{indent}  steps: {}", slider.steps.join(", "));
    }
    let nested = format!("{indent}    ");
    for (option, branch) in field.branches().filter(|(_, branch)| !branch.is_empty()) {
        let _ = writeln!(out, "{indent}  if {option}:");
        for sub in branch {
            describe_field(out, &nested, &sub.name, &sub.field);
        }
    }
}

/// Plain-text outline of a form's fields.
pub fn describe(form: &PublicForm) -> Result<String> {
    let mut out = format!("{} ({})\n", form.title, form.uuid);
    if let Some(expiry) = form.expiry {
        let _ = writeln!(out, "open until {}", expiry.format(&Rfc3339)?);
    }
    for (name, field) in &form.fields {
        describe_field(&mut out, "  ", name, field);
    }
    Ok(out)
}
