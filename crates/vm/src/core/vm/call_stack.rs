use std::{mem, sync::Arc};

use alloy::primitives::Bytes;
use tracing::debug;

use crate::core::{
    analysis::AnalyzedProgram,
    constants::CALL_DEPTH_LIMIT,
    host::{FrameStart, Host},
    message::Message,
    revision::Revision,
    status::StatusCode,
};

use super::{
    core::{Registers, VM},
    execution::{ExecutionResult, State},
    handlers::system,
    interpreter::{validate, Interpreter},
};

/// A frame on the call stack.
#[derive(Debug)]
struct Frame {
    program: Arc<AnalyzedProgram>,
    message: Message,
    registers: Registers,
    /// Whether the host opened the frame, and so has to close it.
    entered: bool,
}

impl Frame {
    fn new(program: Arc<AnalyzedProgram>, message: Message, entered: bool) -> Self {
        let registers = Registers::new(message.gas);
        Frame { program, message, registers, entered }
    }
}

/// One top-level execution and every frame nested inside it.
///
/// Frames live on an explicit call stack rather than on the native one. A call-family
/// instruction suspends the running [`VM`]; the [`Execution`] asks the [`Host`] to open the
/// nested frame, pushes it, and hands its result back to the suspended caller once it finishes.
/// Nesting depth is bounded by the message depth counter alone, however deep a contract recurses.
///
/// ```
/// use bifrost_vm::{
///     core::{
///         message::MessageBuilder,
///         revision::Revision,
///         status::StatusCode,
///         vm::{Execution, Interpreter},
///     },
///     ext::host::InMemoryHost,
/// };
///
/// // PUSH1 1 PUSH1 2 ADD STOP
/// let code = [0x60, 0x01, 0x60, 0x02, 0x01, 0x00];
/// let message = MessageBuilder::default().gas(100i64).build().unwrap();
///
/// let interpreter = Interpreter::default();
/// let mut host = InMemoryHost::default();
/// let mut execution =
///     Execution::with_code(&interpreter, &mut host, Revision::Cancun, &message, &code);
///
/// let mut steps = 0;
/// while let Some(state) = execution.step() {
///     assert_eq!(state.depth, 0);
///     steps += 1;
/// }
/// assert_eq!(steps, 4);
/// assert_eq!(execution.run().status, StatusCode::Success);
/// ```
pub struct Execution<'a> {
    interpreter: &'a Interpreter,
    host: &'a mut dyn Host,
    revision: Revision,
    frames: Vec<Frame>,
    result: Option<ExecutionResult>,
}

impl std::fmt::Debug for Execution<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Execution")
            .field("revision", &self.revision)
            .field("frames", &self.frames)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

impl<'a> Execution<'a> {
    fn empty(interpreter: &'a Interpreter, host: &'a mut dyn Host, revision: Revision) -> Self {
        Execution { interpreter, host, revision, frames: Vec::new(), result: None }
    }

    /// Starts `message` as an outermost frame opened by the host, the way a transaction starts.
    /// The host moves the message value and derives the address of a creation.
    pub fn new(
        interpreter: &'a Interpreter,
        host: &'a mut dyn Host,
        revision: Revision,
        message: &Message,
    ) -> Self {
        let mut execution = Self::empty(interpreter, host, revision);
        if let Err(result) = execution.start(message) {
            execution.result = Some(result);
        }
        execution
    }

    /// Starts running `code` for `message` directly, without asking the host to open the
    /// outermost frame. Nested frames are still opened by the host.
    pub fn with_code(
        interpreter: &'a Interpreter,
        host: &'a mut dyn Host,
        revision: Revision,
        message: &Message,
        code: &[u8],
    ) -> Self {
        let mut execution = Self::empty(interpreter, host, revision);
        if let Err(result) = execution.push_frame(message.clone(), code, false) {
            execution.result = Some(result);
        }
        execution
    }

    /// Starts running an already analyzed program for `message`. No code validation is
    /// performed.
    pub fn with_program(
        interpreter: &'a Interpreter,
        host: &'a mut dyn Host,
        program: Arc<AnalyzedProgram>,
        message: &Message,
    ) -> Self {
        let mut execution = Self::empty(interpreter, host, program.revision());
        if message.depth > CALL_DEPTH_LIMIT {
            execution.result = Some(ExecutionResult::failure(StatusCode::CallDepthExceeded));
        } else {
            execution.frames.push(Frame::new(program, message.clone(), false));
        }
        execution
    }

    /// Number of frames on the call stack, including the running one.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// The result of the outermost frame, once it has finished.
    pub fn result(&self) -> Option<&ExecutionResult> {
        self.result.as_ref()
    }

    /// Executes the next instruction of the innermost frame and returns the state after it.
    /// Returns `None` once the outermost frame has finished.
    ///
    /// A call-family instruction is reported when it suspends its frame, before the steps of
    /// the nested frame. Its outcome shows on the caller's stack at the caller's next step.
    pub fn step(&mut self) -> Option<State> {
        let mut frame = self.frames.pop()?;
        let mut vm = VM::attach(
            &frame.program,
            &frame.message,
            &mut *self.host,
            mem::take(&mut frame.registers),
        );
        let state = vm.step();
        frame.registers = vm.detach();
        self.frames.push(frame);

        self.settle();
        state
    }

    /// Runs every remaining frame to completion and returns the result of the outermost one.
    pub fn run(mut self) -> ExecutionResult {
        while let Some(mut frame) = self.frames.pop() {
            let mut vm = VM::attach(
                &frame.program,
                &frame.message,
                &mut *self.host,
                mem::take(&mut frame.registers),
            );
            vm.execute();
            frame.registers = vm.detach();
            self.frames.push(frame);

            self.settle();
        }

        self.result.unwrap_or_else(|| ExecutionResult::failure(StatusCode::InternalError))
    }

    /// Moves across frame boundaries until the innermost frame can execute its next instruction
    /// or the outermost frame has finished: opens the frame the innermost frame is suspended on,
    /// and closes finished frames, resuming their callers.
    fn settle(&mut self) {
        loop {
            let Some(frame) = self.frames.last() else { return };

            if frame.registers.status.is_some() {
                let Some(frame) = self.frames.pop() else { return };
                let result = self.close(frame);
                if self.frames.is_empty() {
                    self.result = Some(result);
                    return;
                }
                self.resume(result);
            } else if let Some(call) = &frame.registers.pending {
                let message = call.message.clone();
                if let Err(result) = self.start(&message) {
                    self.resume(result);
                }
            } else {
                return;
            }
        }
    }

    /// Asks the host to open a frame for `message` and pushes it. Returns the result of a frame
    /// that ended before running any code.
    fn start(&mut self, message: &Message) -> Result<(), ExecutionResult> {
        match self.host.enter_frame(message) {
            FrameStart::Finished(result) => Err(result),
            FrameStart::Execute { message, code } => self.push_frame(message, &code, true),
        }
    }

    /// Validates and analyzes `code` and pushes a frame running it.
    fn push_frame(
        &mut self,
        message: Message,
        code: &[u8],
        entered: bool,
    ) -> Result<(), ExecutionResult> {
        if let Err(status) = validate(self.revision, &message, code) {
            debug!(status = %status, depth = message.depth, "rejected code before execution");
            let result = ExecutionResult::failure(status);
            return Err(if entered { self.host.exit_frame(&message, result) } else { result });
        }

        let program = self.interpreter.analyze(self.revision, code);
        self.frames.push(Frame::new(program, message, entered));
        Ok(())
    }

    /// Produces the result of a finished frame, letting the host close it.
    fn close(&mut self, frame: Frame) -> ExecutionResult {
        let result = frame.registers.result();
        debug!(
            revision = %self.revision,
            depth = frame.message.depth,
            status = %result.status,
            gas_limit = frame.message.gas,
            gas_left = result.gas_left,
            gas_refund = result.gas_refund,
            output_size = result.output.len(),
            "execution finished"
        );

        if frame.entered {
            self.host.exit_frame(&frame.message, result)
        } else {
            result
        }
    }

    /// Hands `result` to the innermost frame, which is suspended on the frame that produced it.
    fn resume(&mut self, result: ExecutionResult) {
        let Some(frame) = self.frames.last_mut() else { return };
        let Some(call) = frame.registers.pending.take() else { return };

        let mut vm = VM::attach(
            &frame.program,
            &frame.message,
            &mut *self.host,
            mem::take(&mut frame.registers),
        );
        if let Err(status) = system::resume(&mut vm, call, result) {
            vm.exit(status, Bytes::new());
        }
        frame.registers = vm.detach();
    }
}
