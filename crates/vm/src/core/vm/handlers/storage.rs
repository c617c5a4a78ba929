use crate::core::{analysis::Instruction, host::AccessStatus, status::StatusCode};

use super::super::core::VM;

/// SLOAD - Load word from storage
pub fn sload(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let key = vm.stack.pop()?;
    let address = vm.message.recipient;

    // consume dynamic gas
    if vm.schedule.cold_sload_surcharge > 0 &&
        vm.host.access_storage(&address, key) == AccessStatus::Cold
    {
        vm.consume_gas(vm.schedule.cold_sload_surcharge)?;
    }

    let value = vm.host.get_storage(&address, key);
    vm.stack.push(value)
}

/// SSTORE - Save word to storage
pub fn sstore(vm: &mut VM<'_>, instruction: &Instruction) -> Result<(), StatusCode> {
    vm.ensure_not_static()?;

    // EIP-2200: SSTORE must leave more than the call stipend behind
    if let Some(sentry) = vm.schedule.sstore_sentry {
        if vm.precise_gas_left(instruction) <= sentry {
            return Err(StatusCode::OutOfGas);
        }
    }

    let [key, value] = vm.stack.pop_n::<2>()?;
    let address = vm.message.recipient;

    let mut gas_cost = 0;
    if vm.schedule.cold_sstore_surcharge > 0 &&
        vm.host.access_storage(&address, key) == AccessStatus::Cold
    {
        gas_cost += vm.schedule.cold_sstore_surcharge;
    }

    let status = vm.host.set_storage(&address, key, value);
    let cost = vm.schedule.storage_cost(status);

    // consume dynamic gas
    vm.consume_gas(gas_cost + cost.gas)?;
    vm.gas_refund += cost.refund;
    Ok(())
}

/// TLOAD - Load word from transient storage
pub fn tload(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let key = vm.stack.pop()?;
    let value = vm.host.get_transient_storage(&vm.message.recipient, key);
    vm.stack.push(value)
}

/// TSTORE - Save word to transient storage
pub fn tstore(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    vm.ensure_not_static()?;
    let [key, value] = vm.stack.pop_n::<2>()?;
    vm.host.set_transient_storage(&vm.message.recipient, key, value);
    Ok(())
}
