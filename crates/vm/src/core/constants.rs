/// Maximum number of words on the stack.
pub const STACK_LIMIT: usize = 1024;

/// Maximum depth of nested calls and creations.
pub const CALL_DEPTH_LIMIT: u32 = 1024;

/// Size of a memory word in bytes.
pub const WORD_SIZE: usize = 32;

/// Largest memory offset or size the interpreter accepts. Anything larger cannot be paid for.
pub const MAX_BUFFER_SIZE: u64 = u32::MAX as u64;

/// EIP-170 limit on deployed code size.
pub const MAX_CODE_SIZE: usize = 0x6000;

/// EIP-3860 limit on init code size.
pub const MAX_INITCODE_SIZE: usize = 2 * MAX_CODE_SIZE;

/// EIP-3541 reserved first byte of code.
pub const RESERVED_CODE_PREFIX: u8 = 0xef;

/// Number of most recent block hashes available to BLOCKHASH.
pub const BLOCK_HASH_WINDOW: u64 = 256;
