//! Versioned dynamic gas rules.
//!
//! Static per-opcode costs live in the instruction catalogue ([`crate::core::opcodes`]). Everything
//! that is computed while an opcode executes (memory growth, warm/cold surcharges, storage writes,
//! call forwarding) is parametrized here, one [`GasSchedule`] per [`Revision`].

use lazy_static::lazy_static;

use super::{host::StorageStatus, revision::Revision};

/// Gas cost and refund of a single SSTORE outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorageCost {
    /// Gas charged when the write executes.
    pub gas: i64,
    /// Refund accrued (negative values remove a previously granted refund).
    pub refund: i64,
}

/// Base quantities from which the per-status SSTORE table is derived.
#[derive(Debug, Clone, Copy)]
struct StorageCostSpec {
    net_metering: bool,
    warm_access: i64,
    set: i64,
    reset: i64,
    clear_refund: i64,
}

impl StorageCostSpec {
    fn for_revision(revision: Revision) -> Self {
        use Revision::*;
        match revision {
            Frontier | Homestead | TangerineWhistle | SpuriousDragon | Byzantium | Petersburg => {
                Self { net_metering: false, warm_access: 200, set: 20000, reset: 5000, clear_refund: 15000 }
            }
            Constantinople => {
                Self { net_metering: true, warm_access: 200, set: 20000, reset: 5000, clear_refund: 15000 }
            }
            Istanbul => {
                Self { net_metering: true, warm_access: 800, set: 20000, reset: 5000, clear_refund: 15000 }
            }
            Berlin => Self {
                net_metering: true,
                warm_access: WARM_STORAGE_READ_COST,
                set: 20000,
                reset: 5000 - COLD_SLOAD_COST,
                clear_refund: 15000,
            },
            London | Paris | Shanghai | Cancun => Self {
                net_metering: true,
                warm_access: WARM_STORAGE_READ_COST,
                set: 20000,
                reset: 5000 - COLD_SLOAD_COST,
                clear_refund: 4800,
            },
        }
    }

    fn table(self) -> [StorageCost; StorageStatus::COUNT] {
        let cost = |gas: i64, refund: i64| StorageCost { gas, refund };
        let mut table = [StorageCost::default(); StorageStatus::COUNT];

        if !self.net_metering {
            // legacy metering only looks at the current and new values
            table[StorageStatus::Assigned as usize] = cost(self.reset, 0);
            table[StorageStatus::Added as usize] = cost(self.set, 0);
            table[StorageStatus::Deleted as usize] = cost(self.reset, self.clear_refund);
            table[StorageStatus::Modified as usize] = cost(self.reset, 0);
            table[StorageStatus::DeletedAdded as usize] = cost(self.set, 0);
            table[StorageStatus::ModifiedDeleted as usize] = cost(self.reset, self.clear_refund);
            table[StorageStatus::DeletedRestored as usize] = cost(self.set, 0);
            table[StorageStatus::AddedDeleted as usize] = cost(self.reset, self.clear_refund);
            table[StorageStatus::ModifiedRestored as usize] = cost(self.reset, 0);
        } else {
            table[StorageStatus::Assigned as usize] = cost(self.warm_access, 0);
            table[StorageStatus::Added as usize] = cost(self.set, 0);
            table[StorageStatus::Deleted as usize] = cost(self.reset, self.clear_refund);
            table[StorageStatus::Modified as usize] = cost(self.reset, 0);
            table[StorageStatus::DeletedAdded as usize] =
                cost(self.warm_access, -self.clear_refund);
            table[StorageStatus::ModifiedDeleted as usize] =
                cost(self.warm_access, self.clear_refund);
            table[StorageStatus::DeletedRestored as usize] = cost(
                self.warm_access,
                self.reset - self.warm_access - self.clear_refund,
            );
            table[StorageStatus::AddedDeleted as usize] =
                cost(self.warm_access, self.set - self.warm_access);
            table[StorageStatus::ModifiedRestored as usize] =
                cost(self.warm_access, self.reset - self.warm_access);
        }
        table
    }
}

/// EIP-2929 warm storage read cost.
pub const WARM_STORAGE_READ_COST: i64 = 100;

/// EIP-2929 cold SLOAD cost.
pub const COLD_SLOAD_COST: i64 = 2100;

/// EIP-2929 cold account access cost.
pub const COLD_ACCOUNT_ACCESS_COST: i64 = 2600;

/// Dynamic gas rules of one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasSchedule {
    /// The revision these rules belong to.
    pub revision: Revision,
    /// Linear memory cost per word.
    pub memory_word: i64,
    /// Divisor of the quadratic memory term.
    pub memory_quadratic_divisor: i64,
    /// Cost per word copied by the *COPY opcodes.
    pub copy_word: i64,
    /// Cost per word hashed by KECCAK256 and CREATE2.
    pub keccak_word: i64,
    /// Cost per byte of LOG data.
    pub log_data_byte: i64,
    /// Cost per byte of the EXP exponent.
    pub exp_byte: i64,
    /// Cost per word of CREATE/CREATE2 init code (zero before Shanghai).
    pub initcode_word: i64,
    /// Surcharge for transferring value with a call.
    pub call_value: i64,
    /// Gas gifted to the callee when value is transferred.
    pub call_stipend: i64,
    /// Surcharge for calls that bring a new account into existence.
    pub new_account: i64,
    /// Cost per byte of deployed code.
    pub code_deposit_byte: i64,
    /// Full cost of a cold account access, charged by SELFDESTRUCT (zero before Berlin).
    pub cold_account_access: i64,
    /// Extra cost of a cold account access on top of the warm cost (zero before Berlin).
    pub cold_account_surcharge: i64,
    /// Extra cost of a cold SLOAD on top of the warm cost (zero before Berlin).
    pub cold_sload_surcharge: i64,
    /// Extra cost SSTORE pays for a cold slot (zero before Berlin).
    pub cold_sstore_surcharge: i64,
    /// Refund for the first SELFDESTRUCT of an account (zero from London).
    pub selfdestruct_refund: i64,
    /// SSTORE fails unless more than this much gas is left (EIP-2200).
    pub sstore_sentry: Option<i64>,
    /// Calls forward at most `gas - gas / divisor` (EIP-150).
    pub call_gas_divisor: Option<i64>,
    /// Per-status SSTORE costs, indexed by [`StorageStatus`].
    pub storage: [StorageCost; StorageStatus::COUNT],
}

impl GasSchedule {
    fn build(revision: Revision) -> Self {
        let berlin = revision.is_active(Revision::Berlin);
        GasSchedule {
            revision,
            memory_word: 3,
            memory_quadratic_divisor: 512,
            copy_word: 3,
            keccak_word: 6,
            log_data_byte: 8,
            exp_byte: if revision.is_active(Revision::SpuriousDragon) { 50 } else { 10 },
            initcode_word: if revision.is_active(Revision::Shanghai) { 2 } else { 0 },
            call_value: 9000,
            call_stipend: 2300,
            new_account: 25000,
            code_deposit_byte: 200,
            cold_account_access: if berlin { COLD_ACCOUNT_ACCESS_COST } else { 0 },
            cold_account_surcharge: if berlin {
                COLD_ACCOUNT_ACCESS_COST - WARM_STORAGE_READ_COST
            } else {
                0
            },
            cold_sload_surcharge: if berlin { COLD_SLOAD_COST - WARM_STORAGE_READ_COST } else { 0 },
            cold_sstore_surcharge: if berlin { COLD_SLOAD_COST } else { 0 },
            selfdestruct_refund: if revision.is_active(Revision::London) { 0 } else { 24000 },
            sstore_sentry: revision.is_active(Revision::Istanbul).then_some(2300),
            call_gas_divisor: revision.is_active(Revision::TangerineWhistle).then_some(64),
            storage: StorageCostSpec::for_revision(revision).table(),
        }
    }

    /// Returns the schedule of the given revision.
    ///
    /// ```
    /// use bifrost_vm::core::{gas::GasSchedule, revision::Revision};
    ///
    /// assert_eq!(GasSchedule::for_revision(Revision::Frontier).exp_byte, 10);
    /// assert_eq!(GasSchedule::for_revision(Revision::Cancun).exp_byte, 50);
    /// ```
    pub fn for_revision(revision: Revision) -> &'static GasSchedule {
        &GAS_SCHEDULES[revision.index()]
    }

    /// Total cost of a memory of `words` words.
    ///
    /// ```
    /// use bifrost_vm::core::{gas::GasSchedule, revision::Revision};
    ///
    /// let schedule = GasSchedule::for_revision(Revision::Istanbul);
    /// assert_eq!(schedule.memory_cost(1), 3);
    /// assert_eq!(schedule.memory_cost(33), 101);
    /// ```
    #[inline]
    pub fn memory_cost(&self, words: i64) -> i64 {
        self.memory_word * words + words * words / self.memory_quadratic_divisor
    }

    /// Cost of growing memory from `current_words` to `new_words`.
    #[inline]
    pub fn memory_expansion_cost(&self, current_words: i64, new_words: i64) -> i64 {
        if new_words <= current_words {
            0
        } else {
            self.memory_cost(new_words) - self.memory_cost(current_words)
        }
    }

    /// Cost of copying `size` bytes.
    #[inline]
    pub fn copy_cost(&self, size: usize) -> i64 {
        num_words(size) * self.copy_word
    }

    /// Cost of hashing `size` bytes.
    #[inline]
    pub fn keccak_cost(&self, size: usize) -> i64 {
        num_words(size) * self.keccak_word
    }

    /// The largest amount of gas a call may forward when `gas_left` is available.
    #[inline]
    pub fn max_call_gas(&self, gas_left: i64) -> i64 {
        match self.call_gas_divisor {
            Some(divisor) => gas_left - gas_left / divisor,
            None => gas_left,
        }
    }

    /// The SSTORE cost and refund for the given storage status.
    #[inline]
    pub fn storage_cost(&self, status: StorageStatus) -> StorageCost {
        self.storage[status as usize]
    }
}

/// Number of 32-byte words needed to hold `size` bytes.
#[inline]
pub fn num_words(size: usize) -> i64 {
    size.div_ceil(32) as i64
}

lazy_static! {
    static ref GAS_SCHEDULES: Vec<GasSchedule> =
        Revision::ALL.iter().map(|revision| GasSchedule::build(*revision)).collect();
}
