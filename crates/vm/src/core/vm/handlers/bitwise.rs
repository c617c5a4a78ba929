use crate::core::{analysis::Instruction, status::StatusCode, word};

use super::super::core::VM;

/// AND - Bitwise AND operation
pub fn and(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let a = vm.stack.pop()?;
    let b = vm.stack.top_mut()?;
    *b &= a;
    Ok(())
}

/// OR - Bitwise OR operation
pub fn or(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let a = vm.stack.pop()?;
    let b = vm.stack.top_mut()?;
    *b |= a;
    Ok(())
}

/// XOR - Bitwise XOR operation
pub fn xor(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let a = vm.stack.pop()?;
    let b = vm.stack.top_mut()?;
    *b ^= a;
    Ok(())
}

/// NOT - Bitwise NOT operation
pub fn not(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let a = vm.stack.top_mut()?;
    *a = !*a;
    Ok(())
}

/// BYTE - Retrieve single byte from word
pub fn byte(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let index = vm.stack.pop()?;
    let value = vm.stack.top_mut()?;
    *value = word::byte(index, *value);
    Ok(())
}

/// SHL - Shift left operation
pub fn shl(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let shift = vm.stack.pop()?;
    let value = vm.stack.top_mut()?;
    *value = word::shl(shift, *value);
    Ok(())
}

/// SHR - Logical shift right operation
pub fn shr(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let shift = vm.stack.pop()?;
    let value = vm.stack.top_mut()?;
    *value = word::shr(shift, *value);
    Ok(())
}

/// SAR - Arithmetic shift right operation
pub fn sar(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let shift = vm.stack.pop()?;
    let value = vm.stack.top_mut()?;
    *value = word::sar(shift, *value);
    Ok(())
}
