//! Common utilities used across the Bifrost codebase.
//!
//! Hex encoding, helpers for assembling test bytecode, and small file io wrappers shared by the
//! CLI, the configuration crate and the interpreter's tests.

/// Error types for the common crate.
pub mod error;

/// General utility functions.
pub mod utils;
