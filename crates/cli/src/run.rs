use std::sync::Arc;

use alloy::primitives::{address, Address, Bytes, U256};
use bifrost_common::utils::{
    hex::ToLowerHex,
    io::file::read_code,
    strings::{decode_hex, encode_hex_reduced},
};
use bifrost_config::Configuration;
use bifrost_vm::{
    core::{
        analysis::BlockGranularity,
        log::Log,
        message::{CallKind, Message},
        opcodes::opcode_name,
        revision::Revision,
        status::StatusCode,
        vm::{ExecutionResult, Interpreter, State},
    },
    ext::host::InMemoryHost,
};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Error;

/// The account the code under test is installed at.
pub(crate) const CONTRACT: Address = address!("00000000000000000000000000000000000c0de0");

/// The externally owned account that sends the message.
pub(crate) const SENDER: Address = address!("000000000000000000000000000000000000cafe");

#[derive(Debug, Clone, Args)]
#[clap(
    about = "Execute EVM bytecode against an in-memory state",
    override_usage = "bifrost run <CODE> [OPTIONS]"
)]
pub(crate) struct RunArgs {
    /// The bytecode to execute, as hex or as the path of a file containing hex.
    #[clap(required = true)]
    pub code: String,

    /// Call data, as hex.
    #[clap(long, short, default_value = "")]
    pub input: String,

    /// The gas limit. Defaults to the configured `gas_limit`.
    #[clap(long, short)]
    pub gas: Option<i64>,

    /// The protocol revision. Defaults to the configured `revision`.
    #[clap(long, short)]
    pub revision: Option<Revision>,

    /// Wei transferred to the contract with the message.
    #[clap(long, default_value_t = 0)]
    pub value: u128,

    /// Execute as a static call.
    #[clap(long = "static", conflicts_with = "value")]
    pub is_static: bool,

    /// Treat the code as init code and deploy the contract it returns.
    #[clap(long)]
    pub create: bool,

    /// Charge static gas instruction by instruction instead of block by block.
    #[clap(long)]
    pub instruction_metering: bool,

    /// Record every executed instruction, nested frames included.
    #[clap(long)]
    pub trace: bool,

    /// Render the report as JSON.
    #[clap(long)]
    pub json: bool,

    /// The output file, or `print` to write the report to stdout.
    #[clap(long, short, default_value = "print")]
    pub output: String,
}

/// One executed instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct TraceStep {
    pub depth: u32,
    pub offset: usize,
    pub opcode: &'static str,
    pub gas_left: i64,
    pub gas_refund: i64,
    pub stack: Vec<String>,
    pub memory_size: usize,
}

impl From<State> for TraceStep {
    fn from(state: State) -> Self {
        TraceStep {
            depth: state.depth,
            offset: state.offset,
            opcode: opcode_name(state.opcode),
            gas_left: state.gas_left,
            gas_refund: state.gas_refund,
            stack: state.stack.into_iter().map(encode_hex_reduced).collect(),
            memory_size: state.memory_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ReportLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
}

impl From<&Log> for ReportLog {
    fn from(log: &Log) -> Self {
        ReportLog {
            address: log.address.to_lower_hex(),
            topics: log.topics.iter().map(|topic| topic.to_lower_hex()).collect(),
            data: log.data.to_lower_hex(),
        }
    }
}

/// The outcome of `bifrost run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct RunReport {
    pub revision: Revision,
    pub granularity: BlockGranularity,
    pub status: StatusCode,
    pub gas_limit: i64,
    pub gas_used: i64,
    pub gas_left: i64,
    pub gas_refund: i64,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_address: Option<String>,
    pub logs: Vec<ReportLog>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<TraceStep>>,
}

impl RunReport {
    fn new(
        revision: Revision,
        granularity: BlockGranularity,
        gas_limit: i64,
        result: &ExecutionResult,
        logs: &[Log],
    ) -> Self {
        RunReport {
            revision,
            granularity,
            status: result.status,
            gas_limit,
            gas_used: result.gas_used(gas_limit),
            gas_left: result.gas_left,
            gas_refund: result.gas_refund,
            output: result.output.to_lower_hex(),
            create_address: result.create_address.map(|address| address.to_lower_hex()),
            logs: logs.iter().map(ReportLog::from).collect(),
            trace: None,
        }
    }

    /// Renders the report for a terminal.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();

        if let Some(trace) = &self.trace {
            for step in trace {
                lines.push(format!(
                    "{}{} {:<14} {} {:<10} {} {}",
                    "  ".repeat(step.depth as usize),
                    format!("{:06x}", step.offset).dimmed(),
                    step.opcode,
                    "gas:".dimmed(),
                    step.gas_left,
                    "stack:".dimmed(),
                    step.stack.join(", ")
                ));
            }
            lines.push(String::new());
        }

        let status = if self.status.is_success() {
            self.status.to_string().green()
        } else if self.status == StatusCode::Revert {
            self.status.to_string().yellow()
        } else {
            self.status.to_string().red()
        };

        lines.push(format!("{:<12} {}", "status:".bold(), status));
        lines.push(format!("{:<12} {}", "revision:".bold(), self.revision));
        lines.push(format!(
            "{:<12} {} of {} ({} left, {} refund)",
            "gas used:".bold(),
            self.gas_used,
            self.gas_limit,
            self.gas_left,
            self.gas_refund
        ));
        lines.push(format!("{:<12} {}", "output:".bold(), self.output));
        if let Some(address) = &self.create_address {
            lines.push(format!("{:<12} {}", "created:".bold(), address));
        }
        for (index, log) in self.logs.iter().enumerate() {
            lines.push(format!(
                "{:<12} {} topics=[{}] data={}",
                format!("log {index}:").bold(),
                log.address,
                log.topics.join(", "),
                log.data
            ));
        }

        lines.join("\n")
    }
}

/// Executes the code described by `args`, filling unset options from `configuration`.
pub(crate) fn run(args: &RunArgs, configuration: &Configuration) -> Result<RunReport, Error> {
    let code = read_code(&args.code)?;
    let input = decode_hex(&args.input)
        .map_err(|e| Error::Generic(format!("failed to decode call data: {e}")))?;

    let revision = args.revision.unwrap_or(configuration.revision);
    let gas_limit = args.gas.unwrap_or(configuration.gas_limit);
    if gas_limit < 0 {
        return Err(Error::Generic(format!("invalid gas limit: {gas_limit}")));
    }

    let mut vm_config = configuration.vm_config();
    if args.instruction_metering {
        vm_config.block_granularity = BlockGranularity::Instruction;
    }
    let granularity = vm_config.block_granularity;

    let interpreter = Arc::new(Interpreter::new(vm_config));
    let mut host = InMemoryHost::with_interpreter(revision, interpreter);
    let value = U256::from(args.value);
    host.set_balance(SENDER, value);

    debug!(
        revision = %revision,
        granularity = ?granularity,
        gas_limit,
        code_size = code.len(),
        "executing bytecode"
    );

    let message = if args.create {
        Message {
            kind: CallKind::Create,
            gas: gas_limit,
            sender: SENDER,
            input: Bytes::from(code),
            value,
            ..Default::default()
        }
    } else {
        host.set_code(CONTRACT, code);
        Message {
            kind: if args.is_static { CallKind::StaticCall } else { CallKind::Call },
            is_static: args.is_static,
            gas: gas_limit,
            recipient: CONTRACT,
            sender: SENDER,
            input: Bytes::from(input),
            value,
            code_address: CONTRACT,
            ..Default::default()
        }
    };

    let mut trace = Vec::new();
    let result = if args.trace {
        host.transact_traced(&message, |state| trace.push(TraceStep::from(state)))
    } else {
        host.transact(&message)
    };
    if !result.status.is_success() {
        warn!(status = %result.status, "execution did not succeed");
    }
    info!(gas_used = result.gas_used(gas_limit), "execution finished");

    let mut report = RunReport::new(revision, granularity, gas_limit, &result, host.logs());
    if args.trace {
        debug!(steps = trace.len(), "trace finished");
        report.trace = Some(trace);
    }
    Ok(report)
}
