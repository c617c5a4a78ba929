/// Bytecode analysis: instruction decoding, jump destinations and block summaries
pub mod analysis;

/// Constants used throughout the VM implementation
pub mod constants;

/// Versioned dynamic gas rules
pub mod gas;

/// The host interface through which the VM reaches world state
pub mod host;

/// Log implementation for event handling
pub mod log;

/// Memory implementation for VM memory management
pub mod memory;

/// Call messages
pub mod message;

/// Opcode definitions and the per-revision instruction catalogue
pub mod opcodes;

/// Protocol revisions
pub mod revision;

/// Stack implementation for the VM
pub mod stack;

/// Execution outcomes
pub mod status;

/// Core virtual machine implementation
pub mod vm;

/// Signed and bit-level helpers over 256-bit words
pub mod word;
