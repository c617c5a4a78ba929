use clap::{Parser, Subcommand};

use bifrost_config::ConfigArgs;

use crate::{analyze::AnalyzeArgs, log_args::LogArgs, run::RunArgs};

#[derive(Debug, Parser)]
#[clap(name = "bifrost", version)]
pub(crate) struct Arguments {
    #[clap(subcommand)]
    pub sub: Subcommands,

    #[clap(flatten)]
    pub logs: LogArgs,
}

#[derive(Debug, Subcommand)]
#[clap(about = "Bifrost is a block-metered EVM bytecode analyzer and interpreter.")]
pub(crate) enum Subcommands {
    #[clap(name = "run", about = "Execute EVM bytecode against an in-memory state")]
    Run(RunArgs),

    #[clap(name = "analyze", about = "Split EVM bytecode into metered blocks and print them")]
    Analyze(AnalyzeArgs),

    #[clap(name = "config", about = "Display and edit the current configuration")]
    Config(ConfigArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use bifrost_vm::core::revision::Revision;

    #[test]
    fn test_parse_run() {
        let args = Arguments::try_parse_from([
            "bifrost",
            "run",
            "0x00",
            "--gas",
            "100",
            "--revision",
            "berlin",
            "--trace",
        ])
        .expect("failed to parse arguments");

        let Subcommands::Run(run) = args.sub else { panic!("expected the run subcommand") };
        assert_eq!(run.code, "0x00");
        assert_eq!(run.gas, Some(100));
        assert_eq!(run.revision, Some(Revision::Berlin));
        assert!(run.trace);
        assert_eq!(run.output, "print");
    }

    #[test]
    fn test_parse_analyze_defaults() {
        let args = Arguments::try_parse_from(["bifrost", "analyze", "0x00", "-vvv"])
            .expect("failed to parse arguments");

        let Subcommands::Analyze(analyze) = args.sub else {
            panic!("expected the analyze subcommand")
        };
        assert_eq!(analyze.revision, None);
        assert!(!analyze.instruction_metering);
        assert!(args.logs.log_file_directory.is_none());
    }

    #[test]
    fn test_rejects_conflicting_flags() {
        assert!(Arguments::try_parse_from(["bifrost", "run", "0x00", "--create", "--trace"])
            .is_ok());
        assert!(Arguments::try_parse_from(["bifrost", "run", "0x00", "--static", "--value", "1"])
            .is_err());
        assert!(Arguments::try_parse_from(["bifrost", "run", "0x00", "--revision", "nope"])
            .is_err());
    }
}
