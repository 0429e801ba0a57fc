use anyhow::Result;
use beanpack::cli::{Command, RootArgs};
use beanpack::workflow;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.command.verbose());
    match args.command {
        Command::Init(args) => workflow::run_init(args),
        Command::Run(args) => workflow::run_pipeline(args),
        Command::Status(args) => workflow::run_status(args),
    }
}

/// Logs go to stderr; `BEANPACK_LOG` overrides the level chosen by `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("BEANPACK_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
