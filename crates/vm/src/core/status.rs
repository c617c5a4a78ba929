use serde::{Deserialize, Serialize};

/// The terminal outcome of an execution.
///
/// [`StatusCode::Success`] and [`StatusCode::Revert`] are the only outcomes that keep gas and
/// output. Every other variant is fatal: it forfeits all remaining gas and produces no output.
///
/// Interpreter internals use [`StatusCode`] as the error type of their `Result`s, so a fatal
/// condition raised deep inside an opcode handler propagates to the dispatch loop with `?`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// Execution finished with STOP, RETURN, SELFDESTRUCT or by running past the end of code.
    #[error("success")]
    Success,

    /// Execution finished with REVERT.
    #[error("execution reverted")]
    Revert,

    /// A generic failure reported by the host, e.g. a rejected contract deployment.
    #[error("failure")]
    Failure,

    /// Not enough gas for a static or dynamic charge.
    #[error("out of gas")]
    OutOfGas,

    /// A push would exceed the maximum stack height.
    #[error("stack overflow")]
    StackOverflow,

    /// An opcode required more operands than the stack holds.
    #[error("stack underflow")]
    StackUnderflow,

    /// JUMP or JUMPI targeted an offset that is not a JUMPDEST outside push data.
    #[error("bad jump destination")]
    BadJumpDestination,

    /// The opcode is not defined in the selected revision.
    #[error("undefined instruction")]
    UndefinedInstruction,

    /// The designated INVALID (0xfe) opcode was executed.
    #[error("invalid instruction")]
    InvalidInstruction,

    /// A read past the end of the return-data buffer.
    #[error("invalid memory access")]
    InvalidMemoryAccess,

    /// A state-mutating opcode was executed in a static context.
    #[error("static mode violation")]
    StaticModeViolation,

    /// The code failed validation before execution started.
    #[error("code validation failure")]
    CodeValidationFailure,

    /// The message depth exceeds the call depth limit.
    #[error("call depth exceeded")]
    CallDepthExceeded,

    /// An interpreter invariant was violated. Never produced by correct code.
    #[error("internal error")]
    InternalError,
}

impl StatusCode {
    /// Returns true for [`StatusCode::Success`].
    #[inline]
    pub const fn is_success(self) -> bool {
        matches!(self, StatusCode::Success)
    }

    /// Returns true for [`StatusCode::Revert`].
    #[inline]
    pub const fn is_revert(self) -> bool {
        matches!(self, StatusCode::Revert)
    }

    /// Returns true for every outcome that forfeits remaining gas.
    #[inline]
    pub const fn is_fatal(self) -> bool {
        !matches!(self, StatusCode::Success | StatusCode::Revert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(!StatusCode::Success.is_fatal());
        assert!(!StatusCode::Revert.is_fatal());
        assert!(StatusCode::OutOfGas.is_fatal());
        assert!(StatusCode::StaticModeViolation.is_fatal());
        assert!(StatusCode::InternalError.is_fatal());
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusCode::BadJumpDestination.to_string(), "bad jump destination");
        assert_eq!(StatusCode::Revert.to_string(), "execution reverted");
    }
}
