//! CLI argument parsing for the bean pipeline.
//!
//! The CLI is intentionally thin: it wires a run root, a surface snapshot,
//! and the orchestrator together without embedding policy of its own.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "beanpack",
    version,
    about = "Staged documentation pipeline with coverage gates",
    after_help = "Commands:\n  init --out <dir>                                    Write a default beanpack.json\n  run --source <dir> --surfaces <file> [--out <dir>]  Run (or --resume) the pipeline\n  status --out <dir>                                  Summarize checkpoint, gates, and gaps\n\nExamples:\n  beanpack init --out /tmp/shop-run\n  beanpack run --source ./shop --surfaces ./shop-surfaces.json --out /tmp/shop-run\n  beanpack run --source ./shop --surfaces ./shop-surfaces.json --out /tmp/shop-run --resume\n  beanpack status --out /tmp/shop-run --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Init(InitArgs),
    Run(RunArgs),
    Status(StatusArgs),
}

impl Command {
    /// Whether the command asked for a verbose transcript.
    pub fn verbose(&self) -> bool {
        match self {
            Command::Init(_) => false,
            Command::Run(args) => args.verbose,
            Command::Status(args) => args.verbose,
        }
    }
}

/// Init command inputs for bootstrapping a run root.
#[derive(Parser, Debug)]
#[command(about = "Initialize a run root with a default beanpack.json")]
pub struct InitArgs {
    /// Run root that will hold checkpoint, beans, and reports
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Overwrite an existing beanpack.json
    #[arg(long)]
    pub force: bool,
}

/// Run command inputs.
#[derive(Parser, Debug)]
#[command(about = "Run the pipeline: inventory, extract, document, gate")]
pub struct RunArgs {
    /// Local source checkout to document
    #[arg(long, value_name = "DIR")]
    pub source: PathBuf,

    /// Surface snapshot JSON produced by the framework extractors
    #[arg(long, value_name = "FILE")]
    pub surfaces: PathBuf,

    /// Run root (defaults to the local data dir, keyed by source name)
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Continue from the existing checkpoint
    #[arg(long)]
    pub resume: bool,

    /// Emit the run result as JSON
    #[arg(long)]
    pub json: bool,

    /// Emit a verbose transcript of the run
    #[arg(long)]
    pub verbose: bool,
}

/// Status command inputs for a single run root.
#[derive(Parser, Debug)]
#[command(about = "Summarize checkpoint progress, gate results, and gaps")]
pub struct StatusArgs {
    /// Run root to inspect
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,

    /// Emit a verbose transcript
    #[arg(long)]
    pub verbose: bool,
}
