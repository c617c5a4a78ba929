use alloy::primitives::{Address, Bytes, U256};

use crate::core::status::StatusCode;

/// [`ExecutionResult`] is the result of a single contract execution.
///
/// ```
/// use alloy::primitives::Bytes;
/// use bifrost_vm::core::{status::StatusCode, vm::ExecutionResult};
///
/// let result = ExecutionResult::revert(40, Bytes::from_static(b"no"));
/// assert_eq!(result.status, StatusCode::Revert);
/// assert_eq!(result.gas_used(100), 60);
///
/// let result = ExecutionResult::failure(StatusCode::OutOfGas);
/// assert_eq!(result.gas_used(100), 100);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionResult {
    /// The terminal status of the execution.
    pub status: StatusCode,

    /// The amount of gas left after execution completes. Zero unless the execution succeeded or
    /// reverted.
    pub gas_left: i64,

    /// The refund accrued by the execution. Zero unless the execution succeeded.
    pub gas_refund: i64,

    /// The data returned by the execution.
    pub output: Bytes,

    /// The address of the created contract, for successful creations.
    pub create_address: Option<Address>,
}

impl ExecutionResult {
    /// A successful execution.
    pub fn success(gas_left: i64, gas_refund: i64, output: Bytes) -> Self {
        Self { status: StatusCode::Success, gas_left, gas_refund, output, create_address: None }
    }

    /// A reverted execution. Keeps its gas and output, drops any refund.
    pub fn revert(gas_left: i64, output: Bytes) -> Self {
        Self { status: StatusCode::Revert, gas_left, gas_refund: 0, output, create_address: None }
    }

    /// A failed execution. All gas is consumed.
    pub fn failure(status: StatusCode) -> Self {
        Self { status, gas_left: 0, gas_refund: 0, output: Bytes::new(), create_address: None }
    }

    /// Gas consumed out of `gas_limit`.
    pub fn gas_used(&self, gas_limit: i64) -> i64 {
        gas_limit - self.gas_left
    }
}

/// [`State`] is the state of the VM after executing a single instruction. It is returned by
/// [`VM::step`](super::VM::step) and [`Execution::step`](super::Execution::step), and is used
/// for tracing contract execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    /// Call depth of the frame the instruction ran in.
    pub depth: u32,

    /// Byte offset of the instruction that was just executed.
    pub offset: usize,

    /// The opcode of the instruction that was just executed.
    pub opcode: u8,

    /// Gas left after the instruction, as an instruction-by-instruction interpreter would see it.
    pub gas_left: i64,

    /// Refund accrued so far.
    pub gas_refund: i64,

    /// The stack after the instruction, bottom first.
    pub stack: Vec<U256>,

    /// Memory size in bytes.
    pub memory_size: usize,

    /// Set once the instruction finished the execution.
    pub status: Option<StatusCode>,
}
