//! The `bifrost` command line: runs and analyzes EVM bytecode with the block-metered interpreter.

pub(crate) mod analyze;
pub(crate) mod args;
pub(crate) mod error;
pub(crate) mod log_args;
pub(crate) mod output;
pub(crate) mod run;

use clap::Parser;
use tracing::debug;

use args::{Arguments, Subcommands};
use bifrost_config::{config, Configuration};
use error::Error;
use log_args::ColorMode;
use output::write_or_print;

fn main() -> Result<(), Error> {
    let args = Arguments::parse();

    // setup logging; the guard flushes the file writer when dropped
    let _guard = args
        .logs
        .init_tracing()
        .map_err(|e| Error::Generic(format!("failed to initialize tracing: {e}")))?;

    if args.logs.color == ColorMode::Never {
        colored::control::set_override(false);
    }

    let configuration = Configuration::load()
        .map_err(|e| Error::Generic(format!("failed to load configuration: {e}")))?;
    debug!(?configuration, "loaded configuration");

    match args.sub {
        Subcommands::Run(cmd) => {
            let report = run::run(&cmd, &configuration)?;
            let contents =
                if cmd.json { serde_json::to_string_pretty(&report)? } else { report.render() };

            write_or_print(&cmd.output, &contents)?;
        }

        Subcommands::Analyze(cmd) => {
            let listing = analyze::analyze(&cmd, &configuration)?;
            write_or_print(&cmd.output, &listing)?;
        }

        Subcommands::Config(cmd) => {
            config(cmd)?;
        }
    }

    Ok(())
}
