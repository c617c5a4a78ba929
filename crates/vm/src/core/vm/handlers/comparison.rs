use alloy::primitives::U256;

use crate::core::{analysis::Instruction, status::StatusCode, word};

use super::super::core::VM;

#[inline]
fn flag(value: bool) -> U256 {
    if value {
        U256::from(1)
    } else {
        U256::ZERO
    }
}

/// LT - Less-than comparison
pub fn lt(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let a = vm.stack.pop()?;
    let b = vm.stack.top_mut()?;
    *b = flag(a < *b);
    Ok(())
}

/// GT - Greater-than comparison
pub fn gt(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let a = vm.stack.pop()?;
    let b = vm.stack.top_mut()?;
    *b = flag(a > *b);
    Ok(())
}

/// SLT - Signed less-than comparison
pub fn slt(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let a = vm.stack.pop()?;
    let b = vm.stack.top_mut()?;
    *b = flag(word::slt(a, *b));
    Ok(())
}

/// SGT - Signed greater-than comparison
pub fn sgt(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let a = vm.stack.pop()?;
    let b = vm.stack.top_mut()?;
    *b = flag(word::sgt(a, *b));
    Ok(())
}

/// EQ - Equality comparison
pub fn eq(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let a = vm.stack.pop()?;
    let b = vm.stack.top_mut()?;
    *b = flag(a == *b);
    Ok(())
}

/// ISZERO - Simple not operator
pub fn iszero(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let a = vm.stack.top_mut()?;
    *a = flag(a.is_zero());
    Ok(())
}
