use alloy::primitives::U256;

use crate::core::{
    analysis::Instruction,
    status::StatusCode,
    word::{address_to_word, b256_to_word, saturating_usize, word_to_address},
};

use super::super::core::VM;

/// ADDRESS - Get address of currently executing account
pub fn address(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    vm.stack.push(address_to_word(vm.message.recipient))
}

/// BALANCE - Get balance of the given account
pub fn balance(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let address = word_to_address(vm.stack.pop()?);
    vm.access_account(&address)?;
    let balance = vm.host.get_balance(&address);
    vm.stack.push(balance)
}

/// ORIGIN - Get execution origination address
pub fn origin(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let origin = vm.host.tx_context().origin;
    vm.stack.push(address_to_word(origin))
}

/// CALLER - Get caller address
pub fn caller(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    vm.stack.push(address_to_word(vm.message.sender))
}

/// CALLVALUE - Get deposited value by the instruction/transaction responsible for this execution
pub fn callvalue(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    vm.stack.push(vm.message.value)
}

/// CALLDATALOAD - Get input data of current environment. Reads past the end are zero-padded.
pub fn calldataload(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let offset = saturating_usize(vm.stack.pop()?);
    let calldata = vm.calldata();

    let mut value = [0u8; 32];
    if offset < calldata.len() {
        let available = (calldata.len() - offset).min(32);
        value[..available].copy_from_slice(&calldata[offset..offset + available]);
    }
    vm.stack.push(U256::from_be_bytes(value))
}

/// CALLDATASIZE - Get size of input data in current environment
pub fn calldatasize(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let size = vm.calldata().len();
    vm.stack.push(U256::from(size))
}

/// CALLDATACOPY - Copy input data in current environment to memory
pub fn calldatacopy(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let [dest_offset, offset, size] = vm.stack.pop_n::<3>()?;
    let (dest_offset, size) = vm.charge_memory(dest_offset, size)?;

    // consume dynamic gas
    let gas_cost = vm.schedule.copy_cost(size);
    vm.consume_gas(gas_cost)?;

    let calldata = vm.calldata();
    vm.memory.store_padded(dest_offset, size, calldata, saturating_usize(offset));
    Ok(())
}

/// CODESIZE - Get size of code running in current environment
pub fn codesize(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let size = vm.program.code().len();
    vm.stack.push(U256::from(size))
}

/// CODECOPY - Copy code running in current environment to memory
pub fn codecopy(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let [dest_offset, offset, size] = vm.stack.pop_n::<3>()?;
    let (dest_offset, size) = vm.charge_memory(dest_offset, size)?;

    // consume dynamic gas
    let gas_cost = vm.schedule.copy_cost(size);
    vm.consume_gas(gas_cost)?;

    let program = vm.program;
    vm.memory.store_padded(dest_offset, size, program.code(), saturating_usize(offset));
    Ok(())
}

/// GASPRICE - Get price of gas in current environment
pub fn gasprice(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let gas_price = vm.host.tx_context().gas_price;
    vm.stack.push(gas_price)
}

/// EXTCODESIZE - Get size of an account's code
pub fn extcodesize(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let address = word_to_address(vm.stack.pop()?);
    vm.access_account(&address)?;
    let size = vm.host.get_code_size(&address);
    vm.stack.push(U256::from(size))
}

/// EXTCODECOPY - Copy an account's code to memory
pub fn extcodecopy(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let [address, dest_offset, offset, size] = vm.stack.pop_n::<4>()?;
    let address = word_to_address(address);
    let (dest_offset, size) = vm.charge_memory(dest_offset, size)?;

    // consume dynamic gas
    let gas_cost = vm.schedule.copy_cost(size);
    vm.consume_gas(gas_cost)?;
    vm.access_account(&address)?;

    if size > 0 {
        let mut code = vec![0u8; size];
        // bytes past the end of the account's code stay zero
        vm.host.copy_code(&address, saturating_usize(offset), &mut code);
        vm.memory.store(dest_offset, &code);
    }
    Ok(())
}

/// RETURNDATASIZE - Get size of output data from the previous call
pub fn returndatasize(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let size = vm.returndata.len();
    vm.stack.push(U256::from(size))
}

/// RETURNDATACOPY - Copy output data from the previous call to memory. Unlike the other copy
/// opcodes, reading past the end of the buffer is an error.
pub fn returndatacopy(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let [dest_offset, offset, size] = vm.stack.pop_n::<3>()?;
    let (dest_offset, copy_size) = vm.charge_memory(dest_offset, size)?;

    let available = U256::from(vm.returndata.len());
    if offset > available || size > available - offset {
        return Err(StatusCode::InvalidMemoryAccess);
    }

    // consume dynamic gas
    let gas_cost = vm.schedule.copy_cost(copy_size);
    vm.consume_gas(gas_cost)?;

    if copy_size > 0 {
        let offset = saturating_usize(offset);
        let returndata = vm.returndata.clone();
        vm.memory.store(dest_offset, &returndata[offset..offset + copy_size]);
    }
    Ok(())
}

/// EXTCODEHASH - Get hash of an account's code
pub fn extcodehash(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let address = word_to_address(vm.stack.pop()?);
    vm.access_account(&address)?;
    let hash = vm.host.get_code_hash(&address);
    vm.stack.push(b256_to_word(hash))
}

/// SELFBALANCE - Get balance of currently executing account
pub fn selfbalance(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let balance = vm.host.get_balance(&vm.message.recipient);
    vm.stack.push(balance)
}
