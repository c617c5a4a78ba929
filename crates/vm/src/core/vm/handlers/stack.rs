use alloy::primitives::U256;

use crate::core::{analysis::Instruction, status::StatusCode};

use super::super::core::VM;

/// POP - Remove item from stack
pub fn pop(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    vm.stack.pop()?;
    Ok(())
}

/// PUSH0 - Push 0 onto stack
pub fn push0(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    vm.stack.push(U256::ZERO)
}

/// PUSH1-PUSH32 - Push N bytes onto stack. The immediate was decoded during analysis.
pub fn push(vm: &mut VM<'_>, instruction: &Instruction) -> Result<(), StatusCode> {
    vm.stack.push(instruction.push_value)
}

/// DUP1-DUP16 - Duplicate Nth stack item
pub fn dup<const N: usize>(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    vm.stack.dup(N)
}

/// SWAP1-SWAP16 - Exchange 1st and (N+1)th stack items
pub fn swap<const N: usize>(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    vm.stack.swap(N)
}
