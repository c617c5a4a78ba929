//! Bytecode analysis.
//!
//! A single pass over raw bytecode turns it into an [`AnalyzedProgram`]: a linear instruction
//! list with decoded push values, a sorted table of valid jump destinations, and one
//! [`BlockSummary`] per basic block. The interpreter checks a block's summary once on entry
//! instead of checking gas and stack height before every instruction.
//!
//! Analysis never fails. Truncated push data is zero-padded, and undefined opcodes are kept as
//! instructions that fail when executed.

/// Cache of analyzed programs keyed by code hash and revision.
pub mod cache;

use std::fmt::Display;

use alloy::primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{
    opcodes::{opcode_name, push_size, InstructionTable, JUMPDEST, STOP},
    revision::Revision,
};

/// How finely static gas and stack requirements are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockGranularity {
    /// One check per basic block.
    #[default]
    Block,
    /// One check per instruction.
    Instruction,
}

/// Aggregated static requirements of one basic block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockSummary {
    /// Sum of the static gas of every instruction in the block.
    pub gas_cost: i64,
    /// Minimum stack height needed on entry so that no instruction underflows.
    pub stack_req: i32,
    /// Highest stack height reached, relative to the entry height.
    pub stack_max_growth: i32,
}

/// A decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// The opcode byte.
    pub opcode: u8,
    /// Byte offset of the opcode in the code. The implicit trailing STOP sits at `code.len()`.
    pub offset: usize,
    /// The immediate value of PUSH1..PUSH32, zero for every other opcode.
    pub push_value: U256,
    /// Static gas of this instruction in the program's revision.
    pub gas: i64,
    /// Static gas of the instructions that follow in the same block. Adding this to the gas left
    /// gives the gas an instruction-by-instruction interpreter would report.
    pub gas_rest: i64,
    /// Whether the opcode exists in the program's revision.
    pub defined: bool,
    /// Set on the first instruction of every block.
    pub block: Option<BlockSummary>,
}

/// The execution-ready form of some bytecode under one revision.
///
/// Programs are immutable once built, hold no execution state, and can be shared freely between
/// executions and threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedProgram {
    revision: Revision,
    granularity: BlockGranularity,
    code: Bytes,
    instructions: Vec<Instruction>,
    jumpdests: Vec<(usize, usize)>,
}

impl AnalyzedProgram {
    /// The revision the program was analyzed for.
    #[inline]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// The granularity of the block checks.
    #[inline]
    pub fn granularity(&self) -> BlockGranularity {
        self.granularity
    }

    /// The original bytecode.
    #[inline]
    pub fn code(&self) -> &Bytes {
        &self.code
    }

    /// The decoded instructions, always ending with a STOP.
    #[inline]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Valid jump destinations as `(code offset, instruction index)` pairs, sorted by offset.
    #[inline]
    pub fn jumpdests(&self) -> &[(usize, usize)] {
        &self.jumpdests
    }

    /// Number of basic blocks.
    pub fn block_count(&self) -> usize {
        self.instructions.iter().filter(|instruction| instruction.block.is_some()).count()
    }

    /// Resolves a jump target to an instruction index.
    ///
    /// ```
    /// use alloy::primitives::U256;
    /// use bifrost_vm::core::{analysis::analyze, revision::Revision};
    ///
    /// // PUSH1 0x5b JUMPDEST
    /// let program = analyze(Revision::Cancun, &[0x60, 0x5b, 0x5b]);
    /// assert_eq!(program.find_jumpdest(U256::from(2)), Some(1));
    /// assert_eq!(program.find_jumpdest(U256::from(1)), None);
    /// ```
    pub fn find_jumpdest(&self, target: U256) -> Option<usize> {
        let target = usize::try_from(target).ok()?;
        self.jumpdests
            .binary_search_by_key(&target, |(offset, _)| *offset)
            .ok()
            .map(|position| self.jumpdests[position].1)
    }
}

impl Display for AnalyzedProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for instruction in &self.instructions {
            if let Some(block) = &instruction.block {
                writeln!(
                    f,
                    "; block gas={} stack_req={} stack_max_growth={}",
                    block.gas_cost, block.stack_req, block.stack_max_growth
                )?;
            }
            write!(f, "{:06x} {}", instruction.offset, opcode_name(instruction.opcode))?;
            if push_size(instruction.opcode) > 0 {
                write!(f, " {:#x}", instruction.push_value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Running totals of the block being built.
#[derive(Debug, Default)]
struct BlockBuilder {
    start: usize,
    summary: BlockSummary,
    stack_change: i32,
}

impl BlockBuilder {
    fn new(start: usize) -> Self {
        Self { start, ..Default::default() }
    }

    fn add(&mut self, gas: i64, stack_req: i32, stack_change: i32) {
        self.summary.gas_cost += gas;
        self.summary.stack_req = self.summary.stack_req.max(stack_req - self.stack_change);
        self.stack_change += stack_change;
        self.summary.stack_max_growth = self.summary.stack_max_growth.max(self.stack_change);
    }

    /// Writes the summary to the block's first instruction and fills in `gas_rest`.
    fn close(self, instructions: &mut [Instruction]) {
        let block = &mut instructions[self.start..];
        let mut rest = 0;
        for instruction in block.iter_mut().rev() {
            instruction.gas_rest = rest;
            rest += instruction.gas;
        }
        block[0].block = Some(self.summary);
    }
}

/// Analyzes `code` for `revision` with block-level checks.
pub fn analyze(revision: Revision, code: &[u8]) -> AnalyzedProgram {
    analyze_with(revision, code, BlockGranularity::Block)
}

/// Analyzes `code` for `revision` with the given check granularity.
///
/// ```
/// use bifrost_vm::core::{analysis::{analyze_with, BlockGranularity}, revision::Revision};
///
/// // PUSH1 1 PUSH1 2 ADD
/// let code = [0x60, 0x01, 0x60, 0x02, 0x01];
///
/// let blocks = analyze_with(Revision::Cancun, &code, BlockGranularity::Block);
/// assert_eq!(blocks.block_count(), 1);
///
/// let single = analyze_with(Revision::Cancun, &code, BlockGranularity::Instruction);
/// assert_eq!(single.block_count(), 4);
/// ```
pub fn analyze_with(
    revision: Revision,
    code: &[u8],
    granularity: BlockGranularity,
) -> AnalyzedProgram {
    let table = InstructionTable::for_revision(revision);
    let mut instructions: Vec<Instruction> = Vec::with_capacity(code.len() + 1);
    let mut jumpdests = Vec::new();
    let mut block: Option<BlockBuilder> = None;

    let mut pc = 0;
    loop {
        // running past the end executes an implicit STOP
        let opcode = code.get(pc).copied().unwrap_or(STOP);
        let offset = pc.min(code.len());
        let index = instructions.len();

        if opcode == JUMPDEST {
            if let Some(open) = block.take() {
                open.close(&mut instructions);
            }
            jumpdests.push((pc, index));
        }
        let current = block.get_or_insert_with(|| BlockBuilder::new(index));

        let immediate = push_size(opcode);
        let mut push_value = U256::ZERO;
        if immediate > 0 {
            let start = (pc + 1).min(code.len());
            let end = (pc + 1 + immediate).min(code.len());
            let mut word = [0u8; 32];
            word[32 - immediate..32 - immediate + (end - start)].copy_from_slice(&code[start..end]);
            push_value = U256::from_be_bytes(word);
        }

        let spec = table.get(opcode);
        let (gas, ends_block) = match spec {
            Some(spec) => {
                current.add(spec.gas, spec.stack_required(), spec.stack_change());
                (spec.gas, spec.info.ends_block())
            }
            None => (0, true),
        };

        instructions.push(Instruction {
            opcode,
            offset,
            push_value,
            gas,
            gas_rest: 0,
            defined: spec.is_some(),
            block: None,
        });

        if ends_block || granularity == BlockGranularity::Instruction {
            if let Some(open) = block.take() {
                open.close(&mut instructions);
            }
        }

        if pc >= code.len() {
            break;
        }
        pc += 1 + immediate;
    }

    // the trailing STOP always closes its block
    if let Some(open) = block.take() {
        open.close(&mut instructions);
    }

    let program = AnalyzedProgram {
        revision,
        granularity,
        code: Bytes::copy_from_slice(code),
        instructions,
        jumpdests,
    };
    trace!(
        revision = %revision,
        code_size = code.len(),
        instructions = program.instructions.len(),
        blocks = program.block_count(),
        jumpdests = program.jumpdests.len(),
        "analyzed program"
    );
    program
}
