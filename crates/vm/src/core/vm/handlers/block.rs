use alloy::primitives::U256;

use crate::core::{
    analysis::Instruction,
    constants::BLOCK_HASH_WINDOW,
    status::StatusCode,
    word::{address_to_word, b256_to_word, saturating_usize},
};

use super::super::core::VM;

/// BLOCKHASH - Get the hash of one of the 256 most recent complete blocks
pub fn blockhash(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let requested = vm.stack.pop()?;
    let current = vm.host.tx_context().number;

    let hash = match u64::try_from(requested) {
        Ok(number) if number < current && current - number <= BLOCK_HASH_WINDOW => {
            b256_to_word(vm.host.get_block_hash(number))
        }
        _ => U256::ZERO,
    };
    vm.stack.push(hash)
}

/// COINBASE - Get the block's beneficiary address
pub fn coinbase(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let coinbase = vm.host.tx_context().coinbase;
    vm.stack.push(address_to_word(coinbase))
}

/// TIMESTAMP - Get the block's timestamp
pub fn timestamp(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let timestamp = vm.host.tx_context().timestamp;
    vm.stack.push(U256::from(timestamp))
}

/// NUMBER - Get the block's number
pub fn number(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let number = vm.host.tx_context().number;
    vm.stack.push(U256::from(number))
}

/// PREVRANDAO - Get the previous block's RANDAO mix (DIFFICULTY before Paris)
pub fn prevrandao(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let prev_randao = vm.host.tx_context().prev_randao;
    vm.stack.push(prev_randao)
}

/// GASLIMIT - Get the block's gas limit
pub fn gaslimit(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let gas_limit = vm.host.tx_context().gas_limit;
    vm.stack.push(U256::from(gas_limit))
}

/// CHAINID - Get the chain ID
pub fn chainid(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let chain_id = vm.host.tx_context().chain_id;
    vm.stack.push(chain_id)
}

/// BASEFEE - Get the base fee
pub fn basefee(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let base_fee = vm.host.tx_context().base_fee;
    vm.stack.push(base_fee)
}

/// BLOBHASH - Get versioned hashes
pub fn blobhash(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let index = saturating_usize(vm.stack.pop()?);
    let hash = vm
        .host
        .tx_context()
        .blob_hashes
        .get(index)
        .map(|hash| b256_to_word(*hash))
        .unwrap_or_default();
    vm.stack.push(hash)
}

/// BLOBBASEFEE - Returns the value of the blob base-fee of the current block
pub fn blobbasefee(vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    let blob_base_fee = vm.host.tx_context().blob_base_fee;
    vm.stack.push(blob_base_fee)
}
