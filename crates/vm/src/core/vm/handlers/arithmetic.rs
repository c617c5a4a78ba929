use crate::core::{
    analysis::Instruction,
    status::StatusCode,
    word::{self, byte_len},
};

use super::super::core::VM;

/// ADD - Addition operation
pub fn add(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let a = vm.stack.pop()?;
    let b = vm.stack.top_mut()?;
    *b = a.wrapping_add(*b);
    Ok(())
}

/// MUL - Multiplication operation
pub fn mul(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let a = vm.stack.pop()?;
    let b = vm.stack.top_mut()?;
    *b = a.wrapping_mul(*b);
    Ok(())
}

/// SUB - Subtraction operation
pub fn sub(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let a = vm.stack.pop()?;
    let b = vm.stack.top_mut()?;
    *b = a.wrapping_sub(*b);
    Ok(())
}

/// DIV - Integer division operation
pub fn div(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let numerator = vm.stack.pop()?;
    let denominator = vm.stack.top_mut()?;
    *denominator = numerator.checked_div(*denominator).unwrap_or_default();
    Ok(())
}

/// SDIV - Signed integer division operation
pub fn sdiv(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let numerator = vm.stack.pop()?;
    let denominator = vm.stack.top_mut()?;
    *denominator = word::sdiv(numerator, *denominator);
    Ok(())
}

/// MOD - Modulo operation
pub fn modulo(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let a = vm.stack.pop()?;
    let modulus = vm.stack.top_mut()?;
    *modulus = a.checked_rem(*modulus).unwrap_or_default();
    Ok(())
}

/// SMOD - Signed modulo operation
pub fn smod(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let a = vm.stack.pop()?;
    let modulus = vm.stack.top_mut()?;
    *modulus = word::smod(a, *modulus);
    Ok(())
}

/// ADDMOD - Addition modulo operation
pub fn addmod(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let [a, b, modulus] = vm.stack.pop_n::<3>()?;
    vm.stack.push(a.add_mod(b, modulus))
}

/// MULMOD - Multiplication modulo operation
pub fn mulmod(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let [a, b, modulus] = vm.stack.pop_n::<3>()?;
    vm.stack.push(a.mul_mod(b, modulus))
}

/// EXP - Exponential operation
pub fn exp(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let [base, exponent] = vm.stack.pop_n::<2>()?;

    // consume dynamic gas
    let gas_cost = vm.schedule.exp_byte * byte_len(exponent) as i64;
    vm.consume_gas(gas_cost)?;

    vm.stack.push(base.wrapping_pow(exponent))
}

/// SIGNEXTEND - Extend length of two's complement signed integer
pub fn signextend(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let byte_index = vm.stack.pop()?;
    let value = vm.stack.top_mut()?;
    *value = word::signextend(byte_index, *value);
    Ok(())
}
