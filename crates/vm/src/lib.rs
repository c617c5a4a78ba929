//! Bifrost EVM Virtual Machine implementation
//!
//! This crate provides a block-metered Ethereum Virtual Machine (EVM): a single-pass bytecode
//! analyzer that groups instructions into basic blocks, and an interpreter that checks each
//! block's static gas and stack requirements once on entry.

/// Core VM implementation, including analysis, memory, stack, gas rules, opcodes and the
/// interpreter
pub mod core;

/// Extensions to the core VM, including an in-memory host
pub mod ext;
