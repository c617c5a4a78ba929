/// Builders for raw EVM bytecode.
pub mod bytecode;

/// Lowercase hex rendering of EVM types.
pub mod hex;

/// Input/output utilities for file manipulation.
pub mod io;

/// Hex string encoding and decoding.
pub mod strings;
