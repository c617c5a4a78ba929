use alloy::primitives::U256;

use crate::core::{analysis::Instruction, constants::WORD_SIZE, status::StatusCode};

use super::super::core::VM;

/// MLOAD - Load word from memory
pub fn mload(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let offset = vm.stack.pop()?;
    let (offset, _) = vm.charge_memory(offset, U256::from(WORD_SIZE))?;
    let value = vm.memory.load_word(offset);
    vm.stack.push(value)
}

/// MSTORE - Save word to memory
pub fn mstore(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let [offset, value] = vm.stack.pop_n::<2>()?;
    let (offset, _) = vm.charge_memory(offset, U256::from(WORD_SIZE))?;
    vm.memory.store_word(offset, value);
    Ok(())
}

/// MSTORE8 - Save byte to memory
pub fn mstore8(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let [offset, value] = vm.stack.pop_n::<2>()?;
    let (offset, _) = vm.charge_memory(offset, U256::from(1))?;
    vm.memory.store_byte(offset, value.byte(0));
    Ok(())
}

/// MSIZE - Get the size of active memory in bytes
pub fn msize(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let size = vm.memory.size();
    vm.stack.push(U256::from(size))
}

/// MCOPY - Copy memory areas
pub fn mcopy(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let [destination, source, size] = vm.stack.pop_n::<3>()?;
    if size.is_zero() {
        return Ok(());
    }

    // growing memory to cover the farther region covers the nearer one too
    let (_, size) = vm.charge_memory(destination.max(source), size)?;
    let (destination, source) =
        (destination.as_limbs()[0] as usize, source.as_limbs()[0] as usize);

    // consume dynamic gas
    let gas_cost = vm.schedule.copy_cost(size);
    vm.consume_gas(gas_cost)?;

    vm.memory.copy_within(destination, source, size);
    Ok(())
}
