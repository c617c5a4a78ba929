use alloy::primitives::{Address, Bytes, B256, U256};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// The kind of a call message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    /// An ordinary message call.
    #[default]
    Call,
    /// Runs the target's code in the caller's context, transferring value to the caller itself.
    CallCode,
    /// Runs the target's code in the caller's context, keeping sender and value.
    DelegateCall,
    /// A call that forbids state mutation.
    StaticCall,
    /// Contract creation with a nonce-derived address.
    Create,
    /// Contract creation with a salt-derived address.
    Create2,
}

impl CallKind {
    /// Returns true for [`CallKind::Create`] and [`CallKind::Create2`].
    #[inline]
    pub const fn is_create(self) -> bool {
        matches!(self, CallKind::Create | CallKind::Create2)
    }
}

/// The immutable input of one execution.
///
/// For creations, `input` holds the init code; it is executed with empty call data.
///
/// ```
/// use alloy::primitives::Address;
/// use bifrost_vm::core::message::{CallKind, MessageBuilder};
///
/// let message = MessageBuilder::default()
///     .kind(CallKind::StaticCall)
///     .is_static(true)
///     .gas(100_000i64)
///     .recipient(Address::repeat_byte(0x11))
///     .build()
///     .unwrap();
/// assert_eq!(message.depth, 0);
/// assert!(message.is_static);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Builder)]
#[builder(default, setter(into))]
pub struct Message {
    /// The kind of the message.
    pub kind: CallKind,
    /// Whether state-mutating opcodes are forbidden.
    pub is_static: bool,
    /// The call depth, zero for the outermost execution.
    pub depth: u32,
    /// The gas available to the execution.
    pub gas: i64,
    /// The account whose storage and balance the code operates on.
    pub recipient: Address,
    /// The caller.
    pub sender: Address,
    /// Call data, or init code for creations.
    pub input: Bytes,
    /// Value transferred with the message (apparent value for delegate calls).
    pub value: U256,
    /// CREATE2 salt.
    pub salt: B256,
    /// The account whose code is executed. Differs from `recipient` for CALLCODE and DELEGATECALL.
    pub code_address: Address,
}
