use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::cmd::{
    self, Session, export::ExportArgs, form::FormCommand, responses::ResponsesArgs,
    schema::SchemaArgs, submit::SubmitArgs,
};
use crate::config::Config;
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "formkit",
    about = "Build forms, collect responses and export them",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Config file (defaults to $FORMKIT_CONFIG, then the platform config dir)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Directory holding forms and responses
    #[arg(long = "data-dir", value_name = "PATH", global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create, check and show forms
    #[command(subcommand)]
    Form(FormCommand),
    /// Validate a response and store it
    Submit(SubmitArgs),
    /// List the responses to a form
    Responses(ResponsesArgs),
    /// Export the responses to a form as CSV or Excel XML
    Export(ExportArgs),
    /// Print the JSON Schema of a document type
    Schema(SchemaArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let session = Session::new(config, cli.data_dir);
    match cli.command {
        Commands::Form(command) => cmd::form::run(command, &session),
        Commands::Submit(args) => cmd::submit::run(args, &session),
        Commands::Responses(args) => cmd::responses::run(args, &session),
        Commands::Export(args) => cmd::export::run(args, &session),
        Commands::Schema(args) => cmd::schema::run(args),
    }
}
