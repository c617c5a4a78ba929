use crate::core::{analysis::Instruction, log::Log, status::StatusCode, word::word_to_b256};

use super::super::core::VM;

/// LOG0-LOG4 - Append log record with N topics
pub fn log<const N: usize>(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    vm.ensure_not_static()?;

    let [offset, size] = vm.stack.pop_n::<2>()?;
    let topics = vm.stack.pop_n::<N>()?;
    let (offset, size) = vm.charge_memory(offset, size)?;

    // consume dynamic gas
    let gas_cost = vm.schedule.log_data_byte * size as i64;
    vm.consume_gas(gas_cost)?;

    let data = vm.memory.read(offset, size);
    let topics = topics.into_iter().map(word_to_b256).collect();
    vm.host.emit_log(Log::new(vm.message.recipient, topics, &data));
    Ok(())
}
