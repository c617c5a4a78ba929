//! An in-memory [`Host`] with full nested call and creation support.
//!
//! State lives in plain hash maps. Every change made while a frame is open is recorded in an undo
//! journal. A frame that does not succeed replays the journal back to the checkpoint taken when
//! it was opened, which rolls back storage, balances, warm sets, logs and self-destructs together.

use std::{mem, sync::Arc};

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use hashbrown::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::core::{
    constants::{MAX_CODE_SIZE, RESERVED_CODE_PREFIX},
    gas::GasSchedule,
    host::{AccessStatus, FrameStart, Host, StorageStatus, TxContext},
    log::Log,
    message::{CallKind, Message},
    revision::Revision,
    status::StatusCode,
    vm::{Execution, ExecutionResult, Interpreter, State},
};

/// Number of precompile addresses warmed at the start of every transaction.
const PRECOMPILE_COUNT: u8 = 10;

/// A persistent storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorageSlot {
    /// Value at the start of the transaction.
    pub original: U256,
    /// Value now.
    pub current: U256,
}

/// An account of the in-memory world state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Account {
    /// The account nonce.
    pub nonce: u64,
    /// The account balance.
    pub balance: U256,
    /// The account code.
    pub code: Bytes,
    /// Persistent storage.
    pub storage: HashMap<U256, StorageSlot>,
    /// Transient storage, cleared by [`InMemoryHost::begin_transaction`].
    pub transient_storage: HashMap<U256, U256>,
}

impl Account {
    /// EIP-161 emptiness: no code, zero nonce and zero balance.
    pub fn is_empty(&self) -> bool {
        self.nonce == 0 && self.balance.is_zero() && self.code.is_empty()
    }
}

/// The world state.
#[derive(Debug, Default)]
struct WorldState {
    accounts: HashMap<Address, Account>,
    warm_accounts: HashSet<Address>,
    warm_slots: HashSet<(Address, U256)>,
    logs: Vec<Log>,
    selfdestructs: Vec<(Address, Address)>,
}

/// A change to the [`WorldState`], holding what undoes it.
#[derive(Debug, Clone, PartialEq, Eq)]
enum JournalEntry {
    AccountCreated(Address),
    BalanceChanged(Address, U256),
    NonceChanged(Address, u64),
    CodeChanged(Address, Bytes),
    StorageChanged(Address, U256, Option<StorageSlot>),
    TransientStorageChanged(Address, U256, Option<U256>),
    AccountWarmed(Address),
    SlotWarmed(Address, U256),
    LogEmitted,
    Selfdestructed,
}

impl WorldState {
    /// Undoes a single change.
    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::AccountCreated(address) => {
                self.accounts.remove(&address);
            }
            JournalEntry::BalanceChanged(address, balance) => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.balance = balance;
                }
            }
            JournalEntry::NonceChanged(address, nonce) => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.nonce = nonce;
                }
            }
            JournalEntry::CodeChanged(address, code) => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.code = code;
                }
            }
            JournalEntry::StorageChanged(address, key, slot) => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    match slot {
                        Some(slot) => account.storage.insert(key, slot),
                        None => account.storage.remove(&key),
                    };
                }
            }
            JournalEntry::TransientStorageChanged(address, key, value) => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    match value {
                        Some(value) => account.transient_storage.insert(key, value),
                        None => account.transient_storage.remove(&key),
                    };
                }
            }
            JournalEntry::AccountWarmed(address) => {
                self.warm_accounts.remove(&address);
            }
            JournalEntry::SlotWarmed(address, key) => {
                self.warm_slots.remove(&(address, key));
            }
            JournalEntry::LogEmitted => {
                self.logs.pop();
            }
            JournalEntry::Selfdestructed => {
                self.selfdestructs.pop();
            }
        }
    }
}

/// A [`Host`] backed by in-memory maps.
///
/// Nested calls and creations run on the [`Interpreter`] the host was built with, using the
/// host's revision.
///
/// ```
/// use alloy::primitives::{Address, U256};
/// use bifrost_vm::{
///     core::{message::MessageBuilder, revision::Revision, status::StatusCode},
///     ext::host::InMemoryHost,
/// };
///
/// let contract = Address::repeat_byte(0x42);
/// let mut host = InMemoryHost::new(Revision::Cancun);
///
/// // PUSH1 1 PUSH1 0 SSTORE
/// host.set_code(contract, vec![0x60, 0x01, 0x60, 0x00, 0x55]);
///
/// let message = MessageBuilder::default()
///     .gas(100_000i64)
///     .recipient(contract)
///     .code_address(contract)
///     .build()
///     .unwrap();
/// let result = host.transact(&message);
///
/// assert_eq!(result.status, StatusCode::Success);
/// assert_eq!(host.storage(&contract, U256::ZERO), U256::from(1));
/// ```
#[derive(Debug)]
pub struct InMemoryHost {
    revision: Revision,
    interpreter: Arc<Interpreter>,
    tx_context: TxContext,
    block_hashes: HashMap<u64, B256>,
    state: WorldState,
    journal: Vec<JournalEntry>,
    /// Journal lengths at which the open frames started, innermost last.
    checkpoints: Vec<usize>,
    recorded_calls: Vec<Message>,
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new(Revision::default())
    }
}

impl InMemoryHost {
    /// Creates an empty host for `revision` with a default [`Interpreter`].
    pub fn new(revision: Revision) -> Self {
        Self::with_interpreter(revision, Arc::new(Interpreter::default()))
    }

    /// Creates an empty host for `revision` that executes nested frames on `interpreter`.
    pub fn with_interpreter(revision: Revision, interpreter: Arc<Interpreter>) -> Self {
        InMemoryHost {
            revision,
            interpreter,
            tx_context: TxContext::default(),
            block_hashes: HashMap::new(),
            state: WorldState::default(),
            journal: Vec::new(),
            checkpoints: Vec::new(),
            recorded_calls: Vec::new(),
        }
    }

    /// The revision nested frames execute under.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// The engine nested frames execute on.
    pub fn interpreter(&self) -> &Arc<Interpreter> {
        &self.interpreter
    }

    /// Replaces the transaction and block context.
    pub fn set_tx_context(&mut self, tx_context: TxContext) {
        self.tx_context = tx_context;
    }

    /// Registers the hash of a past block.
    pub fn set_block_hash(&mut self, number: u64, hash: B256) {
        self.block_hashes.insert(number, hash);
    }

    /// The account at `address`, if it exists.
    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.state.accounts.get(address)
    }

    /// The account at `address`, created empty if missing. Changes made through it are not
    /// journaled.
    pub fn account_mut(&mut self, address: Address) -> &mut Account {
        self.state.accounts.entry(address).or_default()
    }

    /// Sets the code of `address`.
    pub fn set_code(&mut self, address: Address, code: impl Into<Bytes>) {
        self.account_mut(address).code = code.into();
    }

    /// Sets the balance of `address`.
    pub fn set_balance(&mut self, address: Address, balance: U256) {
        self.account_mut(address).balance = balance;
    }

    /// Sets the nonce of `address`.
    pub fn set_nonce(&mut self, address: Address, nonce: u64) {
        self.account_mut(address).nonce = nonce;
    }

    /// Seeds a storage slot. The value becomes both the original and the current value.
    pub fn insert_storage(&mut self, address: Address, key: U256, value: U256) {
        self.account_mut(address)
            .storage
            .insert(key, StorageSlot { original: value, current: value });
    }

    /// The current value of a storage slot.
    pub fn storage(&self, address: &Address, key: U256) -> U256 {
        self.account(address)
            .and_then(|account| account.storage.get(&key))
            .map(|slot| slot.current)
            .unwrap_or_default()
    }

    /// Logs emitted by successful frames, in order.
    pub fn logs(&self) -> &[Log] {
        &self.state.logs
    }

    /// Self-destructed accounts and their beneficiaries, in order.
    pub fn selfdestructs(&self) -> &[(Address, Address)] {
        &self.state.selfdestructs
    }

    /// Every message passed to [`Host::enter_frame`], including those of frames that later
    /// failed.
    pub fn recorded_calls(&self) -> &[Message] {
        &self.recorded_calls
    }

    /// Number of frames currently open.
    pub fn open_frames(&self) -> usize {
        self.checkpoints.len()
    }

    /// Starts a new transaction: commits current storage values as the original ones, clears
    /// transient storage and warm sets, and warms the addresses EIP-2929 and EIP-3651 require.
    pub fn begin_transaction(&mut self, sender: Address, recipient: Address) {
        self.journal.clear();
        self.checkpoints.clear();

        for account in self.state.accounts.values_mut() {
            account.transient_storage.clear();
            for slot in account.storage.values_mut() {
                slot.original = slot.current;
            }
        }
        self.state.warm_slots.clear();
        self.state.warm_accounts.clear();

        self.state.warm_accounts.insert(sender);
        self.state.warm_accounts.insert(recipient);
        for index in 1..=PRECOMPILE_COUNT {
            self.state.warm_accounts.insert(Address::with_last_byte(index));
        }
        if self.revision.is_active(Revision::Shanghai) {
            self.state.warm_accounts.insert(self.tx_context.coinbase);
        }
    }

    /// Runs `message` as the outermost frame of a new transaction.
    pub fn transact(&mut self, message: &Message) -> ExecutionResult {
        let interpreter = Arc::clone(&self.interpreter);
        self.execution(&interpreter, message).run()
    }

    /// Runs `message` like [`InMemoryHost::transact`], one instruction at a time, handing the
    /// state after every instruction of every frame to `observe`.
    pub fn transact_traced(
        &mut self,
        message: &Message,
        mut observe: impl FnMut(State),
    ) -> ExecutionResult {
        let interpreter = Arc::clone(&self.interpreter);
        let mut execution = self.execution(&interpreter, message);
        while let Some(state) = execution.step() {
            observe(state);
        }
        execution.run()
    }

    /// Starts a transaction for `message` and opens its outermost frame.
    fn execution<'a>(
        &'a mut self,
        interpreter: &'a Interpreter,
        message: &Message,
    ) -> Execution<'a> {
        let target = if message.kind.is_create() { Address::ZERO } else { message.recipient };
        self.begin_transaction(message.sender, target);

        let revision = self.revision;
        Execution::new(interpreter, self, revision, message)
    }

    /// Records `entry` if a frame is open. Changes made outside frames are never rolled back.
    fn record(&mut self, entry: JournalEntry) {
        if !self.checkpoints.is_empty() {
            self.journal.push(entry);
        }
    }

    /// The account at `address`, journaling its creation if it is missing.
    fn touch(&mut self, address: Address) -> &mut Account {
        if !self.state.accounts.contains_key(&address) {
            self.record(JournalEntry::AccountCreated(address));
        }
        self.account_mut(address)
    }

    fn write_balance(&mut self, address: Address, balance: U256) {
        let previous = mem::replace(&mut self.touch(address).balance, balance);
        self.record(JournalEntry::BalanceChanged(address, previous));
    }

    fn write_nonce(&mut self, address: Address, nonce: u64) {
        let previous = mem::replace(&mut self.touch(address).nonce, nonce);
        self.record(JournalEntry::NonceChanged(address, previous));
    }

    fn write_code(&mut self, address: Address, code: Bytes) {
        let previous = mem::replace(&mut self.touch(address).code, code);
        self.record(JournalEntry::CodeChanged(address, previous));
    }

    /// Marks `address` as warm. Returns true if it was cold.
    fn warm_account(&mut self, address: Address) -> bool {
        let cold = self.state.warm_accounts.insert(address);
        if cold {
            self.record(JournalEntry::AccountWarmed(address));
        }
        cold
    }

    /// Opens a checkpoint for a new frame.
    fn checkpoint(&mut self) {
        self.checkpoints.push(self.journal.len());
    }

    /// Closes the innermost checkpoint, keeping its changes or undoing them.
    fn close_checkpoint(&mut self, keep: bool) {
        let Some(checkpoint) = self.checkpoints.pop() else { return };

        if !keep {
            trace!(changes = self.journal.len() - checkpoint, "rolling back frame");
            while self.journal.len() > checkpoint {
                let Some(entry) = self.journal.pop() else { break };
                self.state.undo(entry);
            }
        }
        if self.checkpoints.is_empty() {
            self.journal.clear();
        }
    }

    /// Moves `value` from `from` to `to`. Returns false, moving nothing, if `from` cannot afford it.
    fn transfer(&mut self, from: Address, to: Address, value: U256) -> bool {
        if value.is_zero() {
            return true;
        }
        let balance = self.get_balance(&from);
        if balance < value {
            return false;
        }

        self.write_balance(from, balance - value);
        let recipient = self.get_balance(&to);
        self.write_balance(to, recipient.saturating_add(value));
        true
    }

    /// Derives the address of a new contract and bumps the creator's nonce.
    fn prepare_create(&mut self, message: &Message) -> Address {
        let nonce = self.account(&message.sender).map_or(0, |account| account.nonce);
        self.write_nonce(message.sender, nonce + 1);

        match message.kind {
            CallKind::Create2 => message.sender.create2_from_code(message.salt.0, &message.input),
            _ => message.sender.create(nonce),
        }
    }

    fn start_call(&mut self, message: &Message) -> FrameStart {
        if message.kind == CallKind::Call &&
            !self.transfer(message.sender, message.recipient, message.value)
        {
            return FrameStart::Finished(ExecutionResult::failure(StatusCode::Failure));
        }

        let code = self.account(&message.code_address).map(|account| account.code.clone());
        FrameStart::Execute { message: message.clone(), code: code.unwrap_or_default() }
    }

    fn start_create(&mut self, message: &Message, address: Address) -> FrameStart {
        self.warm_account(address);

        let collision = self
            .account(&address)
            .is_some_and(|account| account.nonce != 0 || !account.code.is_empty());
        if collision {
            debug!(address = %address, "contract address collision");
            return FrameStart::Finished(ExecutionResult::failure(StatusCode::Failure));
        }

        let initial_nonce = u64::from(self.revision.is_active(Revision::SpuriousDragon));
        self.write_nonce(address, initial_nonce);
        if !self.transfer(message.sender, address, message.value) {
            return FrameStart::Finished(ExecutionResult::failure(StatusCode::Failure));
        }

        let mut frame = message.clone();
        frame.recipient = address;
        frame.code_address = address;
        FrameStart::Execute { message: frame, code: message.input.clone() }
    }

    /// Validates and pays for the code returned by an init code execution, then stores it.
    fn deploy(&mut self, address: Address, result: ExecutionResult) -> ExecutionResult {
        let code = result.output;
        if self.revision.is_active(Revision::SpuriousDragon) && code.len() > MAX_CODE_SIZE {
            return ExecutionResult::failure(StatusCode::OutOfGas);
        }
        if self.revision.is_active(Revision::London) && code.first() == Some(&RESERVED_CODE_PREFIX) {
            return ExecutionResult::failure(StatusCode::CodeValidationFailure);
        }

        let schedule = GasSchedule::for_revision(self.revision);
        let deposit_cost = schedule.code_deposit_byte * code.len() as i64;
        let mut gas_left = result.gas_left;
        if gas_left >= deposit_cost {
            gas_left -= deposit_cost;
            trace!(address = %address, code_size = code.len(), "deployed contract");
            self.write_code(address, code);
        } else if self.revision.is_active(Revision::Homestead) {
            return ExecutionResult::failure(StatusCode::OutOfGas);
        }

        ExecutionResult {
            status: StatusCode::Success,
            gas_left,
            gas_refund: result.gas_refund,
            output: Bytes::new(),
            create_address: Some(address),
        }
    }
}

impl Host for InMemoryHost {
    fn account_exists(&self, address: &Address) -> bool {
        match self.account(address) {
            Some(account) if self.revision.is_active(Revision::SpuriousDragon) => {
                !account.is_empty()
            }
            Some(_) => true,
            None => false,
        }
    }

    fn get_storage(&self, address: &Address, key: U256) -> U256 {
        self.storage(address, key)
    }

    fn set_storage(&mut self, address: &Address, key: U256, value: U256) -> StorageStatus {
        let account = self.touch(*address);
        let previous = account.storage.get(&key).copied();
        let slot = previous.unwrap_or_default();
        account.storage.insert(key, StorageSlot { current: value, ..slot });

        self.record(JournalEntry::StorageChanged(*address, key, previous));
        StorageStatus::classify(slot.original, slot.current, value)
    }

    fn get_transient_storage(&self, address: &Address, key: U256) -> U256 {
        self.account(address)
            .and_then(|account| account.transient_storage.get(&key).copied())
            .unwrap_or_default()
    }

    fn set_transient_storage(&mut self, address: &Address, key: U256, value: U256) {
        let previous = self.touch(*address).transient_storage.insert(key, value);
        self.record(JournalEntry::TransientStorageChanged(*address, key, previous));
    }

    fn get_balance(&self, address: &Address) -> U256 {
        self.account(address).map(|account| account.balance).unwrap_or_default()
    }

    fn get_code_size(&self, address: &Address) -> usize {
        self.account(address).map_or(0, |account| account.code.len())
    }

    fn get_code_hash(&self, address: &Address) -> B256 {
        match self.account(address) {
            Some(account) if !account.is_empty() => keccak256(&account.code),
            _ => B256::ZERO,
        }
    }

    fn copy_code(&self, address: &Address, offset: usize, buffer: &mut [u8]) -> usize {
        let code = match self.account(address) {
            Some(account) if offset < account.code.len() => &account.code[offset..],
            _ => return 0,
        };
        let size = code.len().min(buffer.len());
        buffer[..size].copy_from_slice(&code[..size]);
        size
    }

    fn selfdestruct(&mut self, address: &Address, beneficiary: &Address) -> bool {
        let balance = self.get_balance(address);
        self.write_balance(*address, U256::ZERO);
        if address != beneficiary {
            let recipient = self.get_balance(beneficiary);
            self.write_balance(*beneficiary, recipient.saturating_add(balance));
        }

        let first = !self.state.selfdestructs.iter().any(|(destructed, _)| destructed == address);
        self.state.selfdestructs.push((*address, *beneficiary));
        self.record(JournalEntry::Selfdestructed);
        first
    }

    fn enter_frame(&mut self, message: &Message) -> FrameStart {
        self.recorded_calls.push(message.clone());

        // the creator's nonce bump survives a failed creation
        let create_address = message.kind.is_create().then(|| self.prepare_create(message));

        self.checkpoint();
        let start = match create_address {
            Some(address) => self.start_create(message, address),
            None => self.start_call(message),
        };
        if let FrameStart::Finished(result) = &start {
            self.close_checkpoint(result.status.is_success());
        }
        start
    }

    fn exit_frame(&mut self, message: &Message, result: ExecutionResult) -> ExecutionResult {
        let result = if message.kind.is_create() && result.status.is_success() {
            self.deploy(message.recipient, result)
        } else {
            result
        };
        self.close_checkpoint(result.status.is_success());

        trace!(
            kind = ?message.kind,
            depth = message.depth,
            status = %result.status,
            gas_left = result.gas_left,
            "frame finished"
        );
        result
    }

    fn tx_context(&self) -> &TxContext {
        &self.tx_context
    }

    fn get_block_hash(&self, number: u64) -> B256 {
        self.block_hashes.get(&number).copied().unwrap_or_default()
    }

    fn emit_log(&mut self, log: Log) {
        self.state.logs.push(log);
        self.record(JournalEntry::LogEmitted);
    }

    fn access_account(&mut self, address: &Address) -> AccessStatus {
        if self.warm_account(*address) {
            AccessStatus::Cold
        } else {
            AccessStatus::Warm
        }
    }

    fn access_storage(&mut self, address: &Address, key: U256) -> AccessStatus {
        if self.state.warm_slots.insert((*address, key)) {
            self.record(JournalEntry::SlotWarmed(*address, key));
            AccessStatus::Cold
        } else {
            AccessStatus::Warm
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_status_tracks_original_value() {
        let address = Address::repeat_byte(1);
        let mut host = InMemoryHost::default();
        host.insert_storage(address, U256::ZERO, U256::from(1));

        assert_eq!(host.set_storage(&address, U256::ZERO, U256::from(2)), StorageStatus::Modified);
        assert_eq!(
            host.set_storage(&address, U256::ZERO, U256::from(1)),
            StorageStatus::ModifiedRestored
        );

        host.begin_transaction(Address::ZERO, address);
        assert_eq!(host.set_storage(&address, U256::ZERO, U256::ZERO), StorageStatus::Deleted);
    }

    #[test]
    fn test_access_lists() {
        let mut host = InMemoryHost::default();
        let sender = Address::repeat_byte(1);
        let other = Address::repeat_byte(2);
        host.begin_transaction(sender, Address::repeat_byte(3));

        assert_eq!(host.access_account(&sender), AccessStatus::Warm);
        assert_eq!(host.access_account(&Address::with_last_byte(1)), AccessStatus::Warm);
        assert_eq!(host.access_account(&other), AccessStatus::Cold);
        assert_eq!(host.access_account(&other), AccessStatus::Warm);
        assert_eq!(host.access_storage(&other, U256::ZERO), AccessStatus::Cold);
        assert_eq!(host.access_storage(&other, U256::ZERO), AccessStatus::Warm);
    }

    #[test]
    fn test_account_existence_follows_eip161() {
        let address = Address::repeat_byte(9);
        let mut host = InMemoryHost::new(Revision::Homestead);
        host.set_balance(address, U256::ZERO);
        assert!(host.account_exists(&address));

        let mut host = InMemoryHost::new(Revision::SpuriousDragon);
        host.set_balance(address, U256::ZERO);
        assert!(!host.account_exists(&address));
        host.set_nonce(address, 1);
        assert!(host.account_exists(&address));
    }

    #[test]
    fn test_copy_code_is_bounded() {
        let address = Address::repeat_byte(7);
        let mut host = InMemoryHost::default();
        host.set_code(address, vec![1, 2, 3]);

        let mut buffer = [0u8; 4];
        assert_eq!(host.copy_code(&address, 1, &mut buffer), 2);
        assert_eq!(buffer, [2, 3, 0, 0]);
        assert_eq!(host.copy_code(&address, 5, &mut buffer), 0);
    }

    #[test]
    fn test_selfdestruct_moves_balance_once() {
        let (contract, beneficiary) = (Address::repeat_byte(1), Address::repeat_byte(2));
        let mut host = InMemoryHost::default();
        host.set_balance(contract, U256::from(10));

        assert!(host.selfdestruct(&contract, &beneficiary));
        assert!(!host.selfdestruct(&contract, &beneficiary));
        assert_eq!(host.get_balance(&beneficiary), U256::from(10));
        assert_eq!(host.get_balance(&contract), U256::ZERO);
        assert_eq!(host.selfdestructs().len(), 2);
    }

    #[test]
    fn test_failed_frame_rolls_back_state() {
        let contract = Address::repeat_byte(0x42);
        let mut host = InMemoryHost::default();

        // PUSH1 1 PUSH1 0 SSTORE PUSH1 0 PUSH1 0 REVERT
        host.set_code(contract, vec![0x60, 0x01, 0x60, 0x00, 0x55, 0x60, 0x00, 0x60, 0x00, 0xfd]);
        let message = Message {
            gas: 100_000,
            recipient: contract,
            code_address: contract,
            ..Default::default()
        };

        let result = host.transact(&message);
        assert_eq!(result.status, StatusCode::Revert);
        assert!(result.gas_left > 0);
        assert_eq!(host.storage(&contract, U256::ZERO), U256::ZERO);
        assert_eq!(host.recorded_calls().len(), 1);
    }

    #[test]
    fn test_inner_rollback_keeps_outer_changes() {
        let (outer, inner) = (Address::repeat_byte(1), Address::repeat_byte(2));
        let mut host = InMemoryHost::default();
        host.begin_transaction(Address::ZERO, outer);

        let outer_frame = Message { recipient: outer, code_address: outer, ..Default::default() };
        assert!(matches!(host.enter_frame(&outer_frame), FrameStart::Execute { .. }));
        host.set_storage(&outer, U256::ZERO, U256::from(1));

        let inner_frame =
            Message { depth: 1, recipient: inner, code_address: inner, ..Default::default() };
        assert!(matches!(host.enter_frame(&inner_frame), FrameStart::Execute { .. }));
        assert_eq!(host.open_frames(), 2);
        host.set_storage(&inner, U256::ZERO, U256::from(2));
        host.set_transient_storage(&outer, U256::ZERO, U256::from(3));
        assert_eq!(host.access_storage(&inner, U256::ZERO), AccessStatus::Cold);
        host.emit_log(Log::new(inner, Vec::new(), &[]));

        let result = host.exit_frame(&inner_frame, ExecutionResult::failure(StatusCode::Failure));
        assert_eq!(result.status, StatusCode::Failure);
        assert!(host.account(&inner).is_none());
        assert_eq!(host.get_transient_storage(&outer, U256::ZERO), U256::ZERO);
        assert_eq!(host.access_storage(&inner, U256::ZERO), AccessStatus::Cold);
        assert!(host.logs().is_empty());
        assert_eq!(host.storage(&outer, U256::ZERO), U256::from(1));

        host.exit_frame(&outer_frame, ExecutionResult::success(0, 0, Bytes::new()));
        assert_eq!(host.open_frames(), 0);
        assert!(host.journal.is_empty());
        assert_eq!(host.storage(&outer, U256::ZERO), U256::from(1));
    }

    #[test]
    fn test_rollback_restores_overwritten_values() {
        let (contract, other) = (Address::repeat_byte(1), Address::repeat_byte(2));
        let mut host = InMemoryHost::default();
        host.set_balance(contract, U256::from(10));
        host.insert_storage(contract, U256::ZERO, U256::from(7));
        host.begin_transaction(Address::ZERO, contract);

        let frame = Message {
            recipient: other,
            sender: contract,
            code_address: other,
            value: U256::from(4),
            ..Default::default()
        };
        assert!(matches!(host.enter_frame(&frame), FrameStart::Execute { .. }));
        assert_eq!(host.get_balance(&other), U256::from(4));
        host.set_storage(&contract, U256::ZERO, U256::from(8));
        host.selfdestruct(&other, &contract);

        host.exit_frame(&frame, ExecutionResult::revert(0, Bytes::new()));
        assert_eq!(host.get_balance(&contract), U256::from(10));
        assert!(host.account(&other).is_none());
        assert_eq!(host.storage(&contract, U256::ZERO), U256::from(7));
        assert!(host.selfdestructs().is_empty());
    }

    #[test]
    fn test_unaffordable_transfer_closes_frame() {
        let (sender, recipient) = (Address::repeat_byte(1), Address::repeat_byte(2));
        let mut host = InMemoryHost::default();
        host.begin_transaction(sender, recipient);

        let frame = Message {
            recipient,
            sender,
            code_address: recipient,
            value: U256::from(1),
            ..Default::default()
        };
        let start = host.enter_frame(&frame);
        assert!(matches!(start, FrameStart::Finished(ref result) if result.status == StatusCode::Failure));
        assert_eq!(host.open_frames(), 0);
        assert!(host.account(&recipient).is_none());
    }

    #[test]
    fn test_create_derives_address_and_bumps_nonce() {
        let creator = Address::repeat_byte(0x11);
        let mut host = InMemoryHost::default();

        // init code: PUSH1 0 PUSH1 0 RETURN (deploys empty code)
        let message = Message {
            kind: CallKind::Create,
            gas: 100_000,
            sender: creator,
            input: Bytes::from_static(&[0x60, 0x00, 0x60, 0x00, 0xf3]),
            ..Default::default()
        };

        let result = host.transact(&message);
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(result.create_address, Some(creator.create(0)));
        assert_eq!(host.account(&creator).map(|account| account.nonce), Some(1));
        assert_eq!(host.account(&creator.create(0)).map(|account| account.nonce), Some(1));
    }
}
