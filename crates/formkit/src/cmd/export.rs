use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use form_spec::ExportFormat;
use tracing::info;
use uuid::Uuid;

use crate::cmd::Session;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Csv,
    Excel,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Excel => ExportFormat::Excel,
        }
    }
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(value_name = "UUID")]
    pub form: Uuid,
    /// Password set when the form was created
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long, value_enum)]
    pub format: FormatArg,
    /// Write to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

pub fn run(args: ExportArgs, session: &Session) -> Result<()> {
    let format = ExportFormat::from(args.format);
    let rendered = session
        .desk()?
        .export(args.form, args.password.as_deref(), format)
        .with_context(|| format!("failed to export form {} as {format}", args.form))?;

    match &args.out {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(form = %args.form, path = %path.display(), "wrote export");
        }
        None => io::stdout()
            .write_all(rendered.as_bytes())
            .context("failed to write export to stdout")?,
    }
    Ok(())
}
