use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use form_spec::{ResponseData, ResponseSubmission};
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::cmd::{Session, print_json, read_json};

#[derive(Args, Debug)]
pub struct SubmitArgs {
    #[arg(value_name = "UUID")]
    pub form: Uuid,
    /// Answers as `{ "responseData": {...} }` or the bare field mapping
    #[arg(value_name = "response.json")]
    pub response: PathBuf,
    /// Print the stored record as JSON instead of its id
    #[arg(long)]
    pub json: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResponseFile {
    Wrapped(ResponseSubmission),
    Bare(ResponseData),
}

impl ResponseFile {
    fn into_data(self) -> ResponseData {
        match self {
            ResponseFile::Wrapped(submission) => submission.response_data,
            ResponseFile::Bare(data) => data,
        }
    }
}

pub fn run(args: SubmitArgs, session: &Session) -> Result<()> {
    let data = read_json::<ResponseFile>(&args.response)?.into_data();
    let record = session
        .desk()?
        .submit(args.form, data, OffsetDateTime::now_utc())
        .with_context(|| format!("response to form {} was not stored", args.form))?;
    if args.json {
        print_json(&record)
    } else {
        println!("{}", record.id);
        Ok(())
    }
}
