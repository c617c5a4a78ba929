use alloy::primitives::{Address, Bytes, U256};

#[cfg(feature = "step-tracing")]
use tracing::trace;

#[cfg(feature = "step-tracing")]
use crate::core::opcodes::opcode_name;
use crate::core::{
    analysis::{AnalyzedProgram, BlockSummary, Instruction},
    constants::{MAX_BUFFER_SIZE, STACK_LIMIT},
    gas::GasSchedule,
    host::{AccessStatus, Host},
    memory::Memory,
    message::Message,
    revision::Revision,
    stack::Stack,
    status::StatusCode,
};

use super::{
    execution::{ExecutionResult, State},
    handlers::{system::PendingCall, DISPATCH_TABLE},
};

/// The [`VM`] struct represents one execution of an [`AnalyzedProgram`]. \
/// It owns the [`Stack`], [`Memory`] and gas counters of the execution, and borrows the program,
/// the call [`Message`] and the [`Host`] for its lifetime.
///
/// A [`VM`] runs a single frame. A call-family instruction does not run the nested frame: it
/// suspends the [`VM`] with the nested [`Message`] pending (see [`VM::pending_call`]), and
/// [`Execution`](super::Execution) resumes it once the nested frame has finished.
///
/// `pc` indexes the program's instruction list, not the raw bytecode.
pub struct VM<'a> {
    /// The program being executed.
    pub program: &'a AnalyzedProgram,

    /// The message that started the execution.
    pub message: &'a Message,

    /// The environment.
    pub host: &'a mut dyn Host,

    /// Dynamic gas rules of the program's revision.
    pub schedule: &'static GasSchedule,

    /// The EVM stack that holds values during execution.
    pub stack: Stack,

    /// The EVM memory space that can be read from and written to.
    pub memory: Memory,

    /// Index of the next instruction to execute.
    pub pc: usize,

    /// Gas left. With block metering, the static gas of a whole block is deducted on block
    /// entry; see [`Instruction::gas_rest`].
    pub gas_left: i64,

    /// Refund accrued so far.
    pub gas_refund: i64,

    /// Output of the most recent nested call or creation.
    pub returndata: Bytes,

    /// Output of this execution, set by RETURN and REVERT.
    pub output: Bytes,

    /// The terminal status, once execution has finished.
    pub status: Option<StatusCode>,

    /// The nested call or creation the execution is suspended on.
    pub(crate) pending: Option<PendingCall>,
}

/// What a [`VM`] owns, kept aside while its frame waits for a nested frame.
#[derive(Debug, Default)]
pub(crate) struct Registers {
    pub(crate) stack: Stack,
    pub(crate) memory: Memory,
    pub(crate) pc: usize,
    pub(crate) gas_left: i64,
    pub(crate) gas_refund: i64,
    pub(crate) returndata: Bytes,
    pub(crate) output: Bytes,
    pub(crate) status: Option<StatusCode>,
    pub(crate) pending: Option<PendingCall>,
}

impl Registers {
    /// Registers of a frame that has not run yet.
    pub(crate) fn new(gas: i64) -> Self {
        Registers { gas_left: gas, ..Default::default() }
    }

    /// The result of the frame, see [`VM::result`].
    pub(crate) fn result(&self) -> ExecutionResult {
        result_of(self.status, self.gas_left, self.gas_refund, &self.output)
    }
}

/// Success keeps gas, refund and output. Revert keeps gas and output. Every other status
/// forfeits everything.
fn result_of(
    status: Option<StatusCode>,
    gas_left: i64,
    gas_refund: i64,
    output: &Bytes,
) -> ExecutionResult {
    match status {
        Some(StatusCode::Success) => ExecutionResult::success(gas_left, gas_refund, output.clone()),
        Some(StatusCode::Revert) => ExecutionResult::revert(gas_left, output.clone()),
        Some(status) => ExecutionResult::failure(status),
        None => ExecutionResult::failure(StatusCode::InternalError),
    }
}

impl std::fmt::Debug for VM<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VM")
            .field("revision", &self.program.revision())
            .field("depth", &self.message.depth)
            .field("pc", &self.pc)
            .field("gas_left", &self.gas_left)
            .field("gas_refund", &self.gas_refund)
            .field("stack", &self.stack)
            .field("memory_size", &self.memory.size())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl<'a> VM<'a> {
    /// Creates a new [`VM`] ready to execute `program` for `message`.
    ///
    /// ```
    /// use bifrost_vm::{
    ///     core::{analysis::analyze, message::MessageBuilder, revision::Revision, vm::VM},
    ///     ext::host::InMemoryHost,
    /// };
    ///
    /// let program = analyze(Revision::Cancun, &[0x00]);
    /// let message = MessageBuilder::default().gas(100i64).build().unwrap();
    /// let mut host = InMemoryHost::default();
    ///
    /// let vm = VM::new(&program, &message, &mut host);
    /// assert_eq!(vm.gas_left, 100);
    /// assert!(!vm.is_finished());
    /// ```
    pub fn new(program: &'a AnalyzedProgram, message: &'a Message, host: &'a mut dyn Host) -> Self {
        Self::attach(program, message, host, Registers::new(message.gas))
    }

    /// Rebuilds a [`VM`] around registers saved by [`VM::detach`].
    pub(crate) fn attach(
        program: &'a AnalyzedProgram,
        message: &'a Message,
        host: &'a mut dyn Host,
        registers: Registers,
    ) -> Self {
        VM {
            program,
            message,
            host,
            schedule: GasSchedule::for_revision(program.revision()),
            stack: registers.stack,
            memory: registers.memory,
            pc: registers.pc,
            gas_left: registers.gas_left,
            gas_refund: registers.gas_refund,
            returndata: registers.returndata,
            output: registers.output,
            status: registers.status,
            pending: registers.pending,
        }
    }

    /// Releases the borrows of the [`VM`], keeping everything it owns.
    pub(crate) fn detach(self) -> Registers {
        Registers {
            stack: self.stack,
            memory: self.memory,
            pc: self.pc,
            gas_left: self.gas_left,
            gas_refund: self.gas_refund,
            returndata: self.returndata,
            output: self.output,
            status: self.status,
            pending: self.pending,
        }
    }

    /// The revision the program was analyzed for.
    #[inline]
    pub fn revision(&self) -> Revision {
        self.program.revision()
    }

    /// Call data of the execution. Creations run their init code with empty call data.
    #[inline]
    pub fn calldata(&self) -> &'a [u8] {
        if self.message.kind.is_create() {
            &[]
        } else {
            &self.message.input
        }
    }

    /// Whether execution has reached a terminal status.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.status.is_some()
    }

    /// The message of the nested frame the execution is suspended on, if any.
    #[inline]
    pub fn pending_call(&self) -> Option<&Message> {
        self.pending.as_ref().map(|call| &call.message)
    }

    /// Exits current execution with the given status and output.
    pub fn exit(&mut self, status: StatusCode, output: Bytes) {
        self.status = Some(status);
        self.output = output;
    }

    /// Consume gas units, failing with [`StatusCode::OutOfGas`] once the counter goes negative.
    #[inline]
    pub fn consume_gas(&mut self, amount: i64) -> Result<(), StatusCode> {
        self.gas_left -= amount;
        if self.gas_left < 0 {
            return Err(StatusCode::OutOfGas);
        }
        Ok(())
    }

    /// Gas left as an instruction-by-instruction interpreter would see it while executing
    /// `instruction`.
    #[inline]
    pub fn precise_gas_left(&self, instruction: &Instruction) -> i64 {
        self.gas_left + instruction.gas_rest
    }

    /// Charges for and performs the memory growth needed to access `offset..offset + size`.
    /// Returns the region as `usize`s. A zero-sized region is free, whatever its offset.
    pub(crate) fn charge_memory(
        &mut self,
        offset: U256,
        size: U256,
    ) -> Result<(usize, usize), StatusCode> {
        if size.is_zero() {
            return Ok((0, 0));
        }
        let limit = U256::from(MAX_BUFFER_SIZE);
        if offset > limit || size > limit {
            return Err(StatusCode::OutOfGas);
        }

        let (offset, size) = (offset.as_limbs()[0] as usize, size.as_limbs()[0] as usize);
        let cost = self.memory.expansion_cost(self.schedule, offset, size);
        self.consume_gas(cost)?;
        self.memory.extend(offset, size);
        Ok((offset, size))
    }

    /// Charges the EIP-2929 cold access surcharge for `address`, if it applies.
    pub(crate) fn access_account(&mut self, address: &Address) -> Result<(), StatusCode> {
        if self.schedule.cold_account_surcharge > 0 &&
            self.host.access_account(address) == AccessStatus::Cold
        {
            self.consume_gas(self.schedule.cold_account_surcharge)?;
        }
        Ok(())
    }

    /// Fails the execution if the message forbids state mutation.
    #[inline]
    pub(crate) fn ensure_not_static(&self) -> Result<(), StatusCode> {
        if self.message.is_static {
            return Err(StatusCode::StaticModeViolation);
        }
        Ok(())
    }

    /// Checks a block's static requirements and deducts its static gas.
    #[inline]
    fn enter_block(&mut self, block: &BlockSummary) -> Result<(), StatusCode> {
        if self.gas_left < block.gas_cost {
            return Err(StatusCode::OutOfGas);
        }
        let height = self.stack.size() as i32;
        if height < block.stack_req {
            return Err(StatusCode::StackUnderflow);
        }
        if height + block.stack_max_growth > STACK_LIMIT as i32 {
            return Err(StatusCode::StackOverflow);
        }
        self.gas_left -= block.gas_cost;
        Ok(())
    }

    /// Executes the instruction at `pc`.
    fn execute_instruction(&mut self) -> Result<(), StatusCode> {
        let program = self.program;
        let instruction = program.instructions().get(self.pc).ok_or(StatusCode::InternalError)?;

        if let Some(block) = &instruction.block {
            self.enter_block(block)?;
        }

        // if step-tracing feature is enabled, print the current operation
        #[cfg(feature = "step-tracing")]
        trace!(
            pc = instruction.offset,
            opcode = opcode_name(instruction.opcode),
            gas_left = self.precise_gas_left(instruction),
            stack_size = self.stack.size(),
            "executing opcode"
        );

        self.pc += 1;
        DISPATCH_TABLE[instruction.opcode as usize](self, instruction)
    }

    /// Executes the next instruction in the VM and returns a snapshot of the VM state after
    /// executing the instruction. Returns `None` once execution has finished or while it is
    /// suspended on a nested call.
    ///
    /// ```
    /// use bifrost_vm::{
    ///     core::{analysis::analyze, message::MessageBuilder, revision::Revision, vm::VM},
    ///     ext::host::InMemoryHost,
    /// };
    ///
    /// // PUSH1 0x2a STOP
    /// let program = analyze(Revision::Cancun, &[0x60, 0x2a, 0x00]);
    /// let message = MessageBuilder::default().gas(100i64).build().unwrap();
    /// let mut host = InMemoryHost::default();
    /// let mut vm = VM::new(&program, &message, &mut host);
    ///
    /// let state = vm.step().unwrap();
    /// assert_eq!(state.gas_left, 97);
    /// assert_eq!(state.stack.len(), 1);
    ///
    /// vm.step().unwrap(); // STOP
    /// assert!(vm.step().is_none());
    /// ```
    pub fn step(&mut self) -> Option<State> {
        if self.is_finished() || self.pending.is_some() {
            return None;
        }

        let program = self.program;
        let instruction = program.instructions().get(self.pc)?;
        if let Err(status) = self.execute_instruction() {
            self.exit(status, Bytes::new());
        }

        Some(State {
            depth: self.message.depth,
            offset: instruction.offset,
            opcode: instruction.opcode,
            gas_left: self.precise_gas_left(instruction),
            gas_refund: self.gas_refund,
            stack: self.stack.as_slice().to_vec(),
            memory_size: self.memory.size(),
            status: self.status,
        })
    }

    /// Executes instructions until the program finishes or suspends on a nested call. Returns
    /// the result once finished.
    pub fn execute(&mut self) -> Option<ExecutionResult> {
        while self.status.is_none() && self.pending.is_none() {
            if let Err(status) = self.execute_instruction() {
                self.exit(status, Bytes::new());
            }
        }
        self.status.map(|_| self.result())
    }

    /// The result of a finished execution.
    ///
    /// Success keeps gas, refund and output. Revert keeps gas and output. Every other status
    /// forfeits everything.
    pub fn result(&self) -> ExecutionResult {
        result_of(self.status, self.gas_left, self.gas_refund, &self.output)
    }
}
