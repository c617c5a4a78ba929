//! EVM opcode handlers organized by category.
//!
//! Each submodule contains handler functions for related opcodes. Handlers assume the static
//! gas and stack requirements of their block have already been checked, but still propagate
//! stack errors so that a misbehaving program can never corrupt the VM.

/// Arithmetic operations: ADD, MUL, SUB, DIV, SDIV, MOD, SMOD, ADDMOD, MULMOD, EXP, SIGNEXTEND
pub mod arithmetic;

/// Bitwise operations: AND, OR, XOR, NOT, BYTE, SHL, SHR, SAR
pub mod bitwise;

/// Block information: BLOCKHASH, COINBASE, TIMESTAMP, NUMBER, etc.
pub mod block;

/// Comparison operations: LT, GT, SLT, SGT, EQ, ISZERO
pub mod comparison;

/// Control flow: STOP, JUMP, JUMPI, JUMPDEST, PC, GAS, INVALID
pub mod control;

/// Cryptographic operations: KECCAK256
pub mod crypto;

/// Environment information: ADDRESS, BALANCE, CALLER, CALLVALUE, CALLDATALOAD, etc.
pub mod environment;

/// Logging operations: LOG0-LOG4
pub mod logging;

/// Memory operations: MLOAD, MSTORE, MSTORE8, MSIZE, MCOPY
pub mod memory;

/// Stack operations: POP, PUSH0-PUSH32, DUP1-DUP16, SWAP1-SWAP16
pub mod stack;

/// Storage operations: SLOAD, SSTORE, TLOAD, TSTORE
pub mod storage;

/// System operations: CREATE, CALL, CALLCODE, RETURN, DELEGATECALL, STATICCALL, CREATE2, REVERT,
/// SELFDESTRUCT
pub mod system;

use crate::core::{analysis::Instruction, opcodes::*, status::StatusCode};

use super::VM;

/// The signature shared by every opcode handler.
pub type OpFn = fn(&mut VM<'_>, &Instruction) -> Result<(), StatusCode>;

/// Handlers indexed by opcode. Opcodes without a handler fail as undefined; opcodes introduced
/// by later revisions are rejected earlier, during analysis.
pub static DISPATCH_TABLE: [OpFn; 256] = build_dispatch_table();

/// Handler for opcodes that do not exist in the program's revision.
pub fn undefined(_vm: &mut VM<'_>, _instruction: &Instruction) -> Result<(), StatusCode> {
    Err(StatusCode::UndefinedInstruction)
}

const fn build_dispatch_table() -> [OpFn; 256] {
    let mut table: [OpFn; 256] = [undefined as OpFn; 256];

    table[STOP as usize] = control::stop;
    table[ADD as usize] = arithmetic::add;
    table[MUL as usize] = arithmetic::mul;
    table[SUB as usize] = arithmetic::sub;
    table[DIV as usize] = arithmetic::div;
    table[SDIV as usize] = arithmetic::sdiv;
    table[MOD as usize] = arithmetic::modulo;
    table[SMOD as usize] = arithmetic::smod;
    table[ADDMOD as usize] = arithmetic::addmod;
    table[MULMOD as usize] = arithmetic::mulmod;
    table[EXP as usize] = arithmetic::exp;
    table[SIGNEXTEND as usize] = arithmetic::signextend;

    table[LT as usize] = comparison::lt;
    table[GT as usize] = comparison::gt;
    table[SLT as usize] = comparison::slt;
    table[SGT as usize] = comparison::sgt;
    table[EQ as usize] = comparison::eq;
    table[ISZERO as usize] = comparison::iszero;

    table[AND as usize] = bitwise::and;
    table[OR as usize] = bitwise::or;
    table[XOR as usize] = bitwise::xor;
    table[NOT as usize] = bitwise::not;
    table[BYTE as usize] = bitwise::byte;
    table[SHL as usize] = bitwise::shl;
    table[SHR as usize] = bitwise::shr;
    table[SAR as usize] = bitwise::sar;

    table[KECCAK256 as usize] = crypto::keccak256;

    table[ADDRESS as usize] = environment::address;
    table[BALANCE as usize] = environment::balance;
    table[ORIGIN as usize] = environment::origin;
    table[CALLER as usize] = environment::caller;
    table[CALLVALUE as usize] = environment::callvalue;
    table[CALLDATALOAD as usize] = environment::calldataload;
    table[CALLDATASIZE as usize] = environment::calldatasize;
    table[CALLDATACOPY as usize] = environment::calldatacopy;
    table[CODESIZE as usize] = environment::codesize;
    table[CODECOPY as usize] = environment::codecopy;
    table[GASPRICE as usize] = environment::gasprice;
    table[EXTCODESIZE as usize] = environment::extcodesize;
    table[EXTCODECOPY as usize] = environment::extcodecopy;
    table[RETURNDATASIZE as usize] = environment::returndatasize;
    table[RETURNDATACOPY as usize] = environment::returndatacopy;
    table[EXTCODEHASH as usize] = environment::extcodehash;
    table[SELFBALANCE as usize] = environment::selfbalance;

    table[BLOCKHASH as usize] = block::blockhash;
    table[COINBASE as usize] = block::coinbase;
    table[TIMESTAMP as usize] = block::timestamp;
    table[NUMBER as usize] = block::number;
    table[PREVRANDAO as usize] = block::prevrandao;
    table[GASLIMIT as usize] = block::gaslimit;
    table[CHAINID as usize] = block::chainid;
    table[BASEFEE as usize] = block::basefee;
    table[BLOBHASH as usize] = block::blobhash;
    table[BLOBBASEFEE as usize] = block::blobbasefee;

    table[POP as usize] = stack::pop;
    table[MLOAD as usize] = memory::mload;
    table[MSTORE as usize] = memory::mstore;
    table[MSTORE8 as usize] = memory::mstore8;
    table[SLOAD as usize] = storage::sload;
    table[SSTORE as usize] = storage::sstore;
    table[JUMP as usize] = control::jump;
    table[JUMPI as usize] = control::jumpi;
    table[PC as usize] = control::pc;
    table[MSIZE as usize] = memory::msize;
    table[GAS as usize] = control::gas;
    table[JUMPDEST as usize] = control::jumpdest;
    table[TLOAD as usize] = storage::tload;
    table[TSTORE as usize] = storage::tstore;
    table[MCOPY as usize] = memory::mcopy;

    table[PUSH0 as usize] = stack::push0;
    let mut opcode = PUSH1 as usize;
    while opcode <= PUSH32 as usize {
        table[opcode] = stack::push;
        opcode += 1;
    }

    table[DUP1 as usize] = stack::dup::<1>;
    table[DUP2 as usize] = stack::dup::<2>;
    table[DUP3 as usize] = stack::dup::<3>;
    table[DUP4 as usize] = stack::dup::<4>;
    table[DUP5 as usize] = stack::dup::<5>;
    table[DUP6 as usize] = stack::dup::<6>;
    table[DUP7 as usize] = stack::dup::<7>;
    table[DUP8 as usize] = stack::dup::<8>;
    table[DUP9 as usize] = stack::dup::<9>;
    table[DUP10 as usize] = stack::dup::<10>;
    table[DUP11 as usize] = stack::dup::<11>;
    table[DUP12 as usize] = stack::dup::<12>;
    table[DUP13 as usize] = stack::dup::<13>;
    table[DUP14 as usize] = stack::dup::<14>;
    table[DUP15 as usize] = stack::dup::<15>;
    table[DUP16 as usize] = stack::dup::<16>;

    table[SWAP1 as usize] = stack::swap::<1>;
    table[SWAP2 as usize] = stack::swap::<2>;
    table[SWAP3 as usize] = stack::swap::<3>;
    table[SWAP4 as usize] = stack::swap::<4>;
    table[SWAP5 as usize] = stack::swap::<5>;
    table[SWAP6 as usize] = stack::swap::<6>;
    table[SWAP7 as usize] = stack::swap::<7>;
    table[SWAP8 as usize] = stack::swap::<8>;
    table[SWAP9 as usize] = stack::swap::<9>;
    table[SWAP10 as usize] = stack::swap::<10>;
    table[SWAP11 as usize] = stack::swap::<11>;
    table[SWAP12 as usize] = stack::swap::<12>;
    table[SWAP13 as usize] = stack::swap::<13>;
    table[SWAP14 as usize] = stack::swap::<14>;
    table[SWAP15 as usize] = stack::swap::<15>;
    table[SWAP16 as usize] = stack::swap::<16>;

    table[LOG0 as usize] = logging::log::<0>;
    table[LOG1 as usize] = logging::log::<1>;
    table[LOG2 as usize] = logging::log::<2>;
    table[LOG3 as usize] = logging::log::<3>;
    table[LOG4 as usize] = logging::log::<4>;

    table[CREATE as usize] = system::create;
    table[CALL as usize] = system::call;
    table[CALLCODE as usize] = system::callcode;
    table[RETURN as usize] = system::return_;
    table[DELEGATECALL as usize] = system::delegatecall;
    table[CREATE2 as usize] = system::create2;
    table[STATICCALL as usize] = system::staticcall;
    table[REVERT as usize] = system::revert;
    table[INVALID as usize] = control::invalid;
    table[SELFDESTRUCT as usize] = system::selfdestruct;

    table
}

