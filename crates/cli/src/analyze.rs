use bifrost_common::utils::io::file::read_code;
use bifrost_config::Configuration;
use bifrost_vm::core::{
    analysis::{analyze_with, AnalyzedProgram, BlockGranularity},
    revision::Revision,
};
use clap::Args;
use tracing::debug;

use crate::error::Error;

#[derive(Debug, Clone, Args)]
#[clap(
    about = "Split EVM bytecode into metered blocks and print them",
    override_usage = "bifrost analyze <CODE> [OPTIONS]"
)]
pub(crate) struct AnalyzeArgs {
    /// The bytecode to analyze, as hex or as the path of a file containing hex.
    #[clap(required = true)]
    pub code: String,

    /// The protocol revision. Defaults to the configured `revision`.
    #[clap(long, short)]
    pub revision: Option<Revision>,

    /// Give every instruction its own block.
    #[clap(long)]
    pub instruction_metering: bool,

    /// The output file, or `print` to write the listing to stdout.
    #[clap(long, short, default_value = "print")]
    pub output: String,
}

/// Analyzes the code described by `args` and renders the resulting program.
pub(crate) fn analyze(args: &AnalyzeArgs, configuration: &Configuration) -> Result<String, Error> {
    let code = read_code(&args.code)?;
    let revision = args.revision.unwrap_or(configuration.revision);
    let granularity = if args.instruction_metering {
        BlockGranularity::Instruction
    } else {
        configuration.vm_config().block_granularity
    };

    let program = analyze_with(revision, &code, granularity);
    debug!(
        code_size = code.len(),
        instructions = program.instructions().len(),
        blocks = program.block_count(),
        "analyzed bytecode"
    );

    Ok(render(&program))
}

fn render(program: &AnalyzedProgram) -> String {
    format!(
        "; revision: {}\n; instructions: {}\n; blocks: {}\n; jumpdests: {}\n{}",
        program.revision(),
        program.instructions().len(),
        program.block_count(),
        program.jumpdests().len(),
        program
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(code: &str) -> AnalyzeArgs {
        AnalyzeArgs {
            code: code.to_string(),
            revision: None,
            instruction_metering: false,
            output: "print".to_string(),
        }
    }

    #[test]
    fn test_analyze_header() {
        // PUSH1 4 JUMP JUMPDEST STOP
        let listing = analyze(&args("0x6004565b00"), &Configuration::default()).expect("analyze");

        assert!(listing.starts_with("; revision: cancun\n"));
        assert!(listing.contains("; jumpdests: 1\n"));
        assert!(listing.contains("PUSH1"));
        assert!(listing.contains("JUMPDEST"));
    }

    #[test]
    fn test_instruction_metering_splits_blocks() {
        let code = "0x6001600201";
        let blocks = |listing: &str| listing.matches("; block gas=").count();

        let merged = analyze(&args(code), &Configuration::default()).expect("analyze");
        let mut split = args(code);
        split.instruction_metering = true;
        let split = analyze(&split, &Configuration::default()).expect("analyze");

        assert!(blocks(&split) > blocks(&merged));
    }

    #[test]
    fn test_revision_override() {
        let mut args = args("0x5f00");
        args.revision = Some(Revision::Shanghai);

        let listing = analyze(&args, &Configuration::default()).expect("analyze");
        assert!(listing.starts_with("; revision: shanghai\n"));
        assert!(listing.contains("PUSH0"));
    }
}
