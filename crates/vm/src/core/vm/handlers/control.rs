use alloy::primitives::{Bytes, U256};

use crate::core::{analysis::Instruction, status::StatusCode};

use super::super::core::VM;

/// STOP - Halts execution
pub fn stop(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    vm.exit(StatusCode::Success, Bytes::new());
    Ok(())
}

/// JUMP - Alter the program counter
pub fn jump(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let target = vm.stack.pop()?;
    vm.pc = vm.program.find_jumpdest(target).ok_or(StatusCode::BadJumpDestination)?;
    Ok(())
}

/// JUMPI - Conditionally alter the program counter
pub fn jumpi(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let [target, condition] = vm.stack.pop_n::<2>()?;
    if !condition.is_zero() {
        vm.pc = vm.program.find_jumpdest(target).ok_or(StatusCode::BadJumpDestination)?;
    }
    Ok(())
}

/// JUMPDEST - Mark a valid destination for jumps (no-op)
pub fn jumpdest(_vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    Ok(())
}

/// PC - Get the byte offset of the current instruction
pub fn pc(vm: &mut VM<'_>, instruction: &Instruction) -> Result<(), StatusCode> {
    vm.stack.push(U256::from(instruction.offset))
}

/// GAS - Get the amount of available gas, after paying for this instruction
pub fn gas(vm: &mut VM<'_>, instruction: &Instruction) -> Result<(), StatusCode> {
    let gas_left = vm.precise_gas_left(instruction);
    vm.stack.push(U256::from(gas_left))
}

/// INVALID - Designated invalid instruction
pub fn invalid(_vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    Err(StatusCode::InvalidInstruction)
}
