//! The boundary between the interpreter and the world state.
//!
//! The interpreter never owns accounts, storage or logs. Every environment-dependent opcode is
//! delegated to a [`Host`]. Nested calls and creations are opened and closed by the host, while
//! the frames themselves run on the engine's own call stack.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use super::{log::Log, message::Message, vm::ExecutionResult};

/// EIP-2929 access status of an account or storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessStatus {
    /// First access in the transaction.
    Cold,
    /// Accessed before.
    Warm,
}

/// The effect of a storage write, in terms of the slot's original value `X` (at the start of the
/// transaction), its current value `Y` and the new value `Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StorageStatus {
    /// `Y == Z`, or a dirty slot that is neither restored nor cleared.
    Assigned = 0,
    /// `X == Y == 0 != Z`.
    Added = 1,
    /// `X == Y != 0 == Z`.
    Deleted = 2,
    /// `X == Y != 0`, `Z` is neither `0` nor `Y`.
    Modified = 3,
    /// `X != 0 == Y`, `Z` is neither `0` nor `X`.
    DeletedAdded = 4,
    /// `X != 0`, `Y` is neither `0` nor `X`, `Z == 0`.
    ModifiedDeleted = 5,
    /// `X != 0 == Y`, `Z == X`.
    DeletedRestored = 6,
    /// `X == 0`, `Y != 0`, `Z == 0`.
    AddedDeleted = 7,
    /// `X != 0`, `Y` is neither `0` nor `X`, `Z == X`.
    ModifiedRestored = 8,
}

impl StorageStatus {
    /// Number of distinct statuses.
    pub const COUNT: usize = 9;

    /// Classifies a storage write.
    ///
    /// ```
    /// use alloy::primitives::U256;
    /// use bifrost_vm::core::host::StorageStatus;
    ///
    /// let (zero, one, two) = (U256::ZERO, U256::from(1), U256::from(2));
    /// assert_eq!(StorageStatus::classify(zero, zero, one), StorageStatus::Added);
    /// assert_eq!(StorageStatus::classify(one, two, one), StorageStatus::ModifiedRestored);
    /// assert_eq!(StorageStatus::classify(one, one, one), StorageStatus::Assigned);
    /// ```
    pub fn classify(original: U256, current: U256, new: U256) -> StorageStatus {
        if current == new {
            return StorageStatus::Assigned;
        }

        if original == current {
            return if original.is_zero() {
                StorageStatus::Added
            } else if new.is_zero() {
                StorageStatus::Deleted
            } else {
                StorageStatus::Modified
            };
        }

        // dirty slot
        if original.is_zero() {
            return if new.is_zero() { StorageStatus::AddedDeleted } else { StorageStatus::Assigned };
        }
        if current.is_zero() {
            return if new == original {
                StorageStatus::DeletedRestored
            } else {
                StorageStatus::DeletedAdded
            };
        }
        if new.is_zero() {
            StorageStatus::ModifiedDeleted
        } else if new == original {
            StorageStatus::ModifiedRestored
        } else {
            StorageStatus::Assigned
        }
    }
}

/// How a frame opened by [`Host::enter_frame`] proceeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStart {
    /// Run `code` for `message`. For creations the message carries the new account as its
    /// recipient and code address.
    Execute {
        /// The message of the frame.
        message: Message,
        /// The code to run.
        code: Bytes,
    },
    /// The frame ended before any code ran. The host has already closed it.
    Finished(ExecutionResult),
}

/// Transaction and block context visible to the executing code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxContext {
    /// Effective gas price of the transaction.
    pub gas_price: U256,
    /// Transaction origin.
    pub origin: Address,
    /// Block beneficiary.
    pub coinbase: Address,
    /// Block number.
    pub number: u64,
    /// Block timestamp.
    pub timestamp: u64,
    /// Block gas limit.
    pub gas_limit: u64,
    /// Block difficulty before Paris, the beacon randomness after.
    pub prev_randao: U256,
    /// Chain id.
    pub chain_id: U256,
    /// Block base fee.
    pub base_fee: U256,
    /// Versioned hashes of the transaction's blobs.
    pub blob_hashes: Vec<B256>,
    /// Block blob base fee.
    pub blob_base_fee: U256,
}

/// Capabilities the interpreter consumes from its environment.
///
/// Storage keys and values are plain words. Implementations journal their own state: every
/// [`Host::enter_frame`] opens a checkpoint that the matching [`Host::exit_frame`] either keeps
/// or rolls back. Frames nest strictly.
pub trait Host {
    /// Whether the account exists (is non-empty, from Spurious Dragon).
    fn account_exists(&self, address: &Address) -> bool;

    /// Reads a storage slot of `address`.
    fn get_storage(&self, address: &Address, key: U256) -> U256;

    /// Writes a storage slot of `address` and reports the effect of the write.
    fn set_storage(&mut self, address: &Address, key: U256, value: U256) -> StorageStatus;

    /// Reads a transient storage slot of `address`.
    fn get_transient_storage(&self, address: &Address, key: U256) -> U256;

    /// Writes a transient storage slot of `address`.
    fn set_transient_storage(&mut self, address: &Address, key: U256, value: U256);

    /// Balance of `address`.
    fn get_balance(&self, address: &Address) -> U256;

    /// Size of the code of `address`.
    fn get_code_size(&self, address: &Address) -> usize;

    /// Hash of the code of `address`, zero for non-existent accounts.
    fn get_code_hash(&self, address: &Address) -> B256;

    /// Copies the code of `address`, starting at `offset`, into `buffer`. Returns the number of
    /// bytes copied.
    fn copy_code(&self, address: &Address, offset: usize, buffer: &mut [u8]) -> usize;

    /// Registers the self-destruction of `address` in favour of `beneficiary`. Returns true if
    /// the account had not been registered before in this transaction.
    fn selfdestruct(&mut self, address: &Address, beneficiary: &Address) -> bool;

    /// Opens a frame for `message`: checkpoints the state, moves the message value and, for
    /// creations, derives and initializes the new account.
    fn enter_frame(&mut self, message: &Message) -> FrameStart;

    /// Closes the innermost open frame, which ran `message` and ended with `result`. Deploys the
    /// code returned by init code, then keeps the frame's changes if it succeeded and rolls them
    /// back otherwise. Returns the result the caller observes.
    fn exit_frame(&mut self, message: &Message, result: ExecutionResult) -> ExecutionResult;

    /// The transaction and block context.
    fn tx_context(&self) -> &TxContext;

    /// Hash of the block with the given number.
    fn get_block_hash(&self, number: u64) -> B256;

    /// Records a log.
    fn emit_log(&mut self, log: Log);

    /// Marks `address` as accessed and returns its previous status.
    fn access_account(&mut self, address: &Address) -> AccessStatus;

    /// Marks a storage slot as accessed and returns its previous status.
    fn access_storage(&mut self, address: &Address, key: U256) -> AccessStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_clean_slots() {
        let (zero, a, b) = (U256::ZERO, U256::from(1), U256::from(2));
        assert_eq!(StorageStatus::classify(zero, zero, zero), StorageStatus::Assigned);
        assert_eq!(StorageStatus::classify(zero, zero, a), StorageStatus::Added);
        assert_eq!(StorageStatus::classify(a, a, zero), StorageStatus::Deleted);
        assert_eq!(StorageStatus::classify(a, a, b), StorageStatus::Modified);
    }

    #[test]
    fn test_classify_dirty_slots() {
        let (zero, a, b, c) = (U256::ZERO, U256::from(1), U256::from(2), U256::from(3));
        assert_eq!(StorageStatus::classify(a, zero, b), StorageStatus::DeletedAdded);
        assert_eq!(StorageStatus::classify(a, zero, a), StorageStatus::DeletedRestored);
        assert_eq!(StorageStatus::classify(a, b, zero), StorageStatus::ModifiedDeleted);
        assert_eq!(StorageStatus::classify(a, b, a), StorageStatus::ModifiedRestored);
        assert_eq!(StorageStatus::classify(a, b, c), StorageStatus::Assigned);
        assert_eq!(StorageStatus::classify(zero, a, zero), StorageStatus::AddedDeleted);
        assert_eq!(StorageStatus::classify(zero, a, b), StorageStatus::Assigned);
    }
}
