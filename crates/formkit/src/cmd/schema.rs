use anyhow::Result;
use clap::{Args, ValueEnum};
use form_spec::{SchemaKind, json_schema};

use crate::cmd::print_json;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaTarget {
    /// Form draft accepted by `form create`
    Draft,
    /// Stored form definition
    Form,
    /// Response payload accepted by `submit`
    Response,
}

impl From<SchemaTarget> for SchemaKind {
    fn from(target: SchemaTarget) -> Self {
        match target {
            SchemaTarget::Draft => SchemaKind::Draft,
            SchemaTarget::Form => SchemaKind::Form,
            SchemaTarget::Response => SchemaKind::Response,
        }
    }
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[arg(value_enum)]
    pub target: SchemaTarget,
}

pub fn run(args: SchemaArgs) -> Result<()> {
    print_json(&json_schema(args.target.into()))
}
