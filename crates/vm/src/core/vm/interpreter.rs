use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{
    analysis::{cache::ProgramCache, AnalyzedProgram, BlockGranularity},
    constants::{CALL_DEPTH_LIMIT, MAX_CODE_SIZE, MAX_INITCODE_SIZE, RESERVED_CODE_PREFIX},
    host::Host,
    message::Message,
    revision::Revision,
    status::StatusCode,
};

use super::{call_stack::Execution, execution::ExecutionResult};

/// Engine options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmConfig {
    /// How finely static gas and stack requirements are checked.
    pub block_granularity: BlockGranularity,

    /// Maximum number of analyzed programs kept in memory. Zero disables the cache.
    pub cache_capacity: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig { block_granularity: BlockGranularity::Block, cache_capacity: 1024 }
    }
}

/// The execution engine. It validates code, analyzes it once per code hash and revision, and
/// runs it on an [`Execution`] against a caller-supplied [`Host`].
///
/// An [`Interpreter`] holds no per-execution state and may be shared between threads.
///
/// ```
/// use bifrost_vm::{
///     core::{message::MessageBuilder, revision::Revision, status::StatusCode, vm::Interpreter},
///     ext::host::InMemoryHost,
/// };
///
/// // PUSH1 0x2a PUSH1 0 MSTORE PUSH1 32 PUSH1 0 RETURN
/// let code = [0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3];
/// let message = MessageBuilder::default().gas(100_000i64).build().unwrap();
///
/// let interpreter = Interpreter::default();
/// let mut host = InMemoryHost::default();
/// let result = interpreter.execute(&mut host, Revision::Cancun, &message, &code);
///
/// assert_eq!(result.status, StatusCode::Success);
/// assert_eq!(result.output.len(), 32);
/// assert_eq!(result.output[31], 0x2a);
/// assert_eq!(result.gas_used(100_000), 18);
/// ```
#[derive(Debug)]
pub struct Interpreter {
    config: VmConfig,
    cache: ProgramCache,
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new(VmConfig::default())
    }
}

impl Interpreter {
    /// Creates a new [`Interpreter`] with the given configuration.
    pub fn new(config: VmConfig) -> Self {
        Interpreter { config, cache: ProgramCache::new(config.cache_capacity) }
    }

    /// The engine configuration.
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// The cache of analyzed programs.
    pub fn cache(&self) -> &ProgramCache {
        &self.cache
    }

    /// Analyzes `code` for `revision`, reusing a cached analysis when one exists.
    pub fn analyze(&self, revision: Revision, code: &[u8]) -> Arc<AnalyzedProgram> {
        self.cache.get_or_analyze(revision, self.config.block_granularity, code)
    }

    /// Validates and executes `code` for `message`, running every nested frame it opens.
    pub fn execute(
        &self,
        host: &mut dyn Host,
        revision: Revision,
        message: &Message,
        code: &[u8],
    ) -> ExecutionResult {
        Execution::with_code(self, host, revision, message, code).run()
    }

    /// Executes an already analyzed program for `message`. No code validation is performed.
    pub fn execute_program(
        &self,
        host: &mut dyn Host,
        program: Arc<AnalyzedProgram>,
        message: &Message,
    ) -> ExecutionResult {
        Execution::with_program(self, host, program, message).run()
    }

    /// Runs `message` as a transaction's outermost frame, which the host opens and closes like
    /// any nested one.
    pub fn transact(
        &self,
        host: &mut dyn Host,
        revision: Revision,
        message: &Message,
    ) -> ExecutionResult {
        Execution::new(self, host, revision, message).run()
    }
}

/// Checks a message and its code before any instruction runs: the call depth, the code size
/// limits and the reserved `0xEF` prefix. [`Interpreter::execute`] fails with the returned status
/// without running anything.
pub fn validate(revision: Revision, message: &Message, code: &[u8]) -> Result<(), StatusCode> {
    if message.depth > CALL_DEPTH_LIMIT {
        return Err(StatusCode::CallDepthExceeded);
    }

    let oversized = if message.kind.is_create() {
        revision.is_active(Revision::Shanghai) && code.len() > MAX_INITCODE_SIZE
    } else {
        revision.is_active(Revision::SpuriousDragon) && code.len() > MAX_CODE_SIZE
    };
    if oversized {
        return Err(StatusCode::CodeValidationFailure);
    }

    // EIP-3541
    if revision.is_active(Revision::London) && code.first() == Some(&RESERVED_CODE_PREFIX) {
        return Err(StatusCode::CodeValidationFailure);
    }
    Ok(())
}
