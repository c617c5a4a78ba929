use alloy::primitives::{Bytes, B256, U256};

use crate::core::{
    analysis::Instruction,
    constants::{CALL_DEPTH_LIMIT, MAX_INITCODE_SIZE},
    gas::num_words,
    host::AccessStatus,
    message::{CallKind, Message},
    revision::Revision,
    status::StatusCode,
    word::{address_to_word, saturating_u64, word_to_address, word_to_b256},
};

use super::super::{core::VM, execution::ExecutionResult};

/// A nested call or creation a suspended [`VM`] waits on, with what is needed to hand its result
/// back.
#[derive(Debug, Clone)]
pub(crate) struct PendingCall {
    pub(crate) message: Message,
    output_offset: usize,
    output_size: usize,
}

/// CREATE - Create a new account with associated code
pub fn create(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    create_with(vm, CallKind::Create)
}

/// CREATE2 - Create a new account with associated code at a predictable address
pub fn create2(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    create_with(vm, CallKind::Create2)
}

/// CALL - Message-call into an account
pub fn call(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    call_with(vm, CallKind::Call)
}

/// CALLCODE - Message-call into this account with alternative account's code
pub fn callcode(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    call_with(vm, CallKind::CallCode)
}

/// DELEGATECALL - Message-call into this account with an alternative account's code, but
/// persisting the current values for sender and value
pub fn delegatecall(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    call_with(vm, CallKind::DelegateCall)
}

/// STATICCALL - Static message-call into an account
pub fn staticcall(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    call_with(vm, CallKind::StaticCall)
}

/// RETURN - Halt execution returning output data
pub fn return_(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let output = read_output(vm)?;
    vm.exit(StatusCode::Success, output);
    Ok(())
}

/// REVERT - Halt execution reverting state changes but returning data and remaining gas
pub fn revert(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let output = read_output(vm)?;
    vm.exit(StatusCode::Revert, output);
    Ok(())
}

/// SELFDESTRUCT - Halt execution and register account for later deletion
pub fn selfdestruct(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    vm.ensure_not_static()?;

    let beneficiary = word_to_address(vm.stack.pop()?);
    let recipient = vm.message.recipient;

    // consume dynamic gas
    if vm.schedule.cold_account_access > 0 &&
        vm.host.access_account(&beneficiary) == AccessStatus::Cold
    {
        vm.consume_gas(vm.schedule.cold_account_access)?;
    }

    // EIP-161 only charges for new accounts when value is actually moved
    let revision = vm.revision();
    if revision.is_active(Revision::TangerineWhistle) &&
        (revision == Revision::TangerineWhistle || !vm.host.get_balance(&recipient).is_zero()) &&
        !vm.host.account_exists(&beneficiary)
    {
        vm.consume_gas(vm.schedule.new_account)?;
    }

    if vm.host.selfdestruct(&recipient, &beneficiary) && vm.schedule.selfdestruct_refund > 0 {
        vm.gas_refund += vm.schedule.selfdestruct_refund;
    }

    vm.exit(StatusCode::Success, Bytes::new());
    Ok(())
}

/// Pops `offset, size`, pays for the memory and returns a copy of the region.
fn read_output(vm: &mut VM<'_>) -> Result<Bytes, StatusCode> {
    let [offset, size] = vm.stack.pop_n::<2>()?;
    let (offset, size) = vm.charge_memory(offset, size)?;
    Ok(Bytes::from(vm.memory.read(offset, size)))
}

fn call_with(vm: &mut VM<'_>, kind: CallKind) -> Result<(), StatusCode> {
    let [gas, address] = vm.stack.pop_n::<2>()?;
    let address = word_to_address(address);
    let value = match kind {
        CallKind::Call | CallKind::CallCode => vm.stack.pop()?,
        _ => U256::ZERO,
    };
    let [input_offset, input_size, output_offset, output_size] = vm.stack.pop_n::<4>()?;

    vm.access_account(&address)?;

    let (input_offset, input_size) = vm.charge_memory(input_offset, input_size)?;
    let (output_offset, output_size) = vm.charge_memory(output_offset, output_size)?;

    let has_value = !value.is_zero();
    if kind == CallKind::Call && has_value {
        vm.ensure_not_static()?;
    }

    // consume dynamic gas
    let mut cost = if has_value { vm.schedule.call_value } else { 0 };
    if kind == CallKind::Call &&
        (has_value || !vm.revision().is_active(Revision::SpuriousDragon)) &&
        !vm.host.account_exists(&address)
    {
        cost += vm.schedule.new_account;
    }
    vm.consume_gas(cost)?;

    let mut message_gas = i64::try_from(saturating_u64(gas)).unwrap_or(i64::MAX);
    if vm.schedule.call_gas_divisor.is_some() {
        message_gas = message_gas.min(vm.schedule.max_call_gas(vm.gas_left));
    } else if message_gas > vm.gas_left {
        return Err(StatusCode::OutOfGas);
    }

    if has_value {
        message_gas += vm.schedule.call_stipend;
        vm.gas_left += vm.schedule.call_stipend;
    }

    vm.returndata = Bytes::new();

    if vm.message.depth >= CALL_DEPTH_LIMIT {
        return vm.stack.push(U256::ZERO);
    }
    if has_value && vm.host.get_balance(&vm.message.recipient) < value {
        return vm.stack.push(U256::ZERO);
    }

    let message = Message {
        kind,
        is_static: kind == CallKind::StaticCall || vm.message.is_static,
        depth: vm.message.depth + 1,
        gas: message_gas,
        recipient: match kind {
            CallKind::CallCode | CallKind::DelegateCall => vm.message.recipient,
            _ => address,
        },
        sender: match kind {
            CallKind::DelegateCall => vm.message.sender,
            _ => vm.message.recipient,
        },
        input: Bytes::from(vm.memory.read(input_offset, input_size)),
        value: match kind {
            CallKind::DelegateCall => vm.message.value,
            _ => value,
        },
        salt: B256::ZERO,
        code_address: address,
    };

    vm.pending = Some(PendingCall { message, output_offset, output_size });
    Ok(())
}

fn create_with(vm: &mut VM<'_>, kind: CallKind) -> Result<(), StatusCode> {
    vm.ensure_not_static()?;

    let [endowment, init_offset, init_size] = vm.stack.pop_n::<3>()?;
    let salt = match kind {
        CallKind::Create2 => word_to_b256(vm.stack.pop()?),
        _ => B256::ZERO,
    };

    let (init_offset, init_size) = vm.charge_memory(init_offset, init_size)?;

    // EIP-3860: limit and meter init code
    if vm.revision().is_active(Revision::Shanghai) && init_size > MAX_INITCODE_SIZE {
        return Err(StatusCode::OutOfGas);
    }

    // consume dynamic gas
    let words = num_words(init_size);
    let mut cost = vm.schedule.initcode_word * words;
    if kind == CallKind::Create2 {
        cost += vm.schedule.keccak_word * words;
    }
    vm.consume_gas(cost)?;

    vm.returndata = Bytes::new();

    if vm.message.depth >= CALL_DEPTH_LIMIT {
        return vm.stack.push(U256::ZERO);
    }
    if !endowment.is_zero() && vm.host.get_balance(&vm.message.recipient) < endowment {
        return vm.stack.push(U256::ZERO);
    }

    let message_gas = vm.schedule.max_call_gas(vm.gas_left);
    let message = Message {
        kind,
        is_static: false,
        depth: vm.message.depth + 1,
        gas: message_gas,
        recipient: Default::default(),
        sender: vm.message.recipient,
        input: Bytes::from(vm.memory.read(init_offset, init_size)),
        value: endowment,
        salt,
        code_address: Default::default(),
    };

    vm.pending = Some(PendingCall { message, output_offset: 0, output_size: 0 });
    Ok(())
}

/// Completes the call-family instruction `vm` is suspended on with the result of the nested
/// frame: returns unused gas, copies call output to memory and pushes the outcome.
pub(crate) fn resume(
    vm: &mut VM<'_>,
    call: PendingCall,
    result: ExecutionResult,
) -> Result<(), StatusCode> {
    vm.gas_left -= call.message.gas - result.gas_left;
    vm.gas_refund += result.gas_refund;

    let outcome = if call.message.kind.is_create() {
        match (result.status, result.create_address) {
            (StatusCode::Success, Some(address)) => address_to_word(address),
            _ => U256::ZERO,
        }
    } else {
        let copy_size = call.output_size.min(result.output.len());
        if copy_size > 0 {
            vm.memory.store(call.output_offset, &result.output[..copy_size]);
        }
        U256::from(result.status.is_success() as u8)
    };

    vm.returndata = result.output;
    vm.stack.push(outcome)
}
