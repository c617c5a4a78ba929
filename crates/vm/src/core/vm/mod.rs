//! Virtual Machine implementation for EVM execution.
//!
//! This module provides the [`VM`], which executes one [`AnalyzedProgram`](super::analysis::AnalyzedProgram)
//! for one message, the [`Execution`], which keeps the call stack of nested frames, and the
//! [`Interpreter`], which validates code, caches its analysis and drives executions to completion.

mod call_stack;
mod core;
mod execution;
mod interpreter;

/// Opcode handlers organized by category.
pub mod handlers;

pub use self::core::VM;
pub use call_stack::Execution;
pub use execution::{ExecutionResult, State};
pub use interpreter::{validate, Interpreter, VmConfig};
