use alloy::primitives::keccak256 as hash;

use crate::core::{analysis::Instruction, status::StatusCode, word::b256_to_word};

use super::super::core::VM;

/// KECCAK256 - Compute Keccak-256 hash
pub fn keccak256(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let [offset, size] = vm.stack.pop_n::<2>()?;
    let (offset, size) = vm.charge_memory(offset, size)?;

    // consume dynamic gas
    let gas_cost = vm.schedule.keccak_cost(size);
    vm.consume_gas(gas_cost)?;

    let data = vm.memory.read(offset, size);
    vm.stack.push(b256_to_word(hash(data)))
}
