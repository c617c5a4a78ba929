//! Integration tests for single-frame execution: termination, faults, gas and opcode semantics.

#[cfg(test)]
mod integration_tests {
    use alloy::primitives::{b256, Address, Bytes, U256};
    use bifrost_common::utils::bytecode::{push, push_word, repeat, ret_top};
    use bifrost_vm::{
        core::{
            analysis::analyze,
            host::TxContext,
            message::Message,
            opcodes::{self, *},
            revision::Revision,
            status::StatusCode,
            vm::{ExecutionResult, VM},
        },
        ext::host::InMemoryHost,
    };

    const CONTRACT: Address = Address::repeat_byte(0xcc);
    const GAS: i64 = 1_000_000;

    fn message(gas: i64) -> Message {
        Message { gas, recipient: CONTRACT, code_address: CONTRACT, ..Default::default() }
    }

    fn execute_with(host: &mut InMemoryHost, code: &[u8], message: &Message) -> ExecutionResult {
        host.set_code(CONTRACT, code.to_vec());
        host.transact(message)
    }

    fn execute(revision: Revision, code: &[u8], gas: i64) -> ExecutionResult {
        let mut host = InMemoryHost::new(revision);
        execute_with(&mut host, code, &message(gas))
    }

    /// Runs `code` followed by a return of the top stack word.
    fn eval(code: &[u8]) -> U256 {
        let result = execute(Revision::Cancun, &[code, &ret_top()].concat(), GAS);
        assert_eq!(result.status, StatusCode::Success, "{code:02x?}");
        U256::from_be_slice(&result.output)
    }

    #[test]
    fn test_push_pop_loop_gas() {
        let code = [repeat(&[PUSH1, 0x2a, POP], 1024), vec![STOP]].concat();
        let result = execute(Revision::Cancun, &code, GAS);
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(result.gas_used(GAS), 1024 * (3 + 2));
        assert!(result.output.is_empty());
    }

    #[test]
    fn test_empty_code_succeeds_for_free() {
        let result = execute(Revision::Cancun, &[], 0);
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(result.gas_left, 0);

        let result = execute(Revision::Cancun, &[PUSH1, 1], 100);
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(result.gas_left, 97);
    }

    #[test]
    fn test_jump_into_push_data_is_rejected() {
        // PUSH1 4 JUMP PUSH1 0x5b STOP: offset 4 is a JUMPDEST byte inside push data
        let code = [PUSH1, 4, JUMP, PUSH1, JUMPDEST, STOP];
        let result = execute(Revision::Cancun, &code, GAS);
        assert_eq!(result.status, StatusCode::BadJumpDestination);
        assert_eq!(result.gas_left, 0);
    }

    #[test]
    fn test_jumpi_only_branches_on_nonzero() {
        // PUSH1 0 PUSH1 0xff JUMPI STOP: the invalid target is never validated
        let result = execute(Revision::Cancun, &[PUSH1, 0, PUSH1, 0xff, JUMPI, STOP], GAS);
        assert_eq!(result.status, StatusCode::Success);

        let result = execute(Revision::Cancun, &[PUSH1, 1, PUSH1, 0xff, JUMPI, STOP], GAS);
        assert_eq!(result.status, StatusCode::BadJumpDestination);
    }

    #[test]
    fn test_revert_preserves_gas_and_output() {
        // PUSH1 0xaa PUSH1 0 MSTORE8 PUSH1 1 PUSH1 0 REVERT
        let code = [PUSH1, 0xaa, PUSH1, 0, MSTORE8, PUSH1, 1, PUSH1, 0, REVERT];
        let result = execute(Revision::Cancun, &code, 100);
        assert_eq!(result.status, StatusCode::Revert);
        assert_eq!(result.gas_left, 100 - (3 + 3 + 3 + 3 + 3 + 3));
        assert_eq!(result.output, Bytes::from_static(&[0xaa]));
        assert_eq!(result.gas_refund, 0);
    }

    #[test]
    fn test_fatal_statuses_forfeit_gas() {
        let cases: &[(&[u8], StatusCode)] = &[
            (&[INVALID], StatusCode::InvalidInstruction),
            (&[0x0c], StatusCode::UndefinedInstruction),
            (&[ADD], StatusCode::StackUnderflow),
            (&[PUSH1, 1, JUMP], StatusCode::BadJumpDestination),
        ];
        for (code, status) in cases {
            let result = execute(Revision::Cancun, code, GAS);
            assert_eq!(result.status, *status, "{code:02x?}");
            assert_eq!(result.gas_left, 0);
            assert!(result.output.is_empty());
        }
    }

    #[test]
    fn test_stack_limit() {
        let result = execute(Revision::Cancun, &repeat(&[PUSH1, 1], 1024), GAS);
        assert_eq!(result.status, StatusCode::Success);

        let result = execute(Revision::Cancun, &repeat(&[PUSH1, 1], 1025), GAS);
        assert_eq!(result.status, StatusCode::StackOverflow);
        assert_eq!(result.gas_left, 0);
    }

    #[test]
    fn test_out_of_gas_boundaries() {
        let result = execute(Revision::Cancun, &[PUSH1, 1], 0);
        assert_eq!(result.status, StatusCode::OutOfGas);

        let result = execute(Revision::Cancun, &[PUSH1, 1], 2);
        assert_eq!(result.status, StatusCode::OutOfGas);

        let result = execute(Revision::Cancun, &[PUSH1, 1], 3);
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(result.gas_left, 0);

        // memory expansion is charged even when static gas suffices
        let result = execute(Revision::Cancun, &[PUSH1, 0, MLOAD], 6);
        assert_eq!(result.status, StatusCode::OutOfGas);
        let result = execute(Revision::Cancun, &[PUSH1, 0, MLOAD], 9);
        assert_eq!(result.status, StatusCode::Success);
    }

    #[test]
    fn test_huge_memory_offsets_run_out_of_gas() {
        let code = [push_word(U256::MAX), vec![MLOAD]].concat();
        let result = execute(Revision::Cancun, &code, GAS);
        assert_eq!(result.status, StatusCode::OutOfGas);

        // zero-sized accesses never touch memory
        let code = [vec![PUSH1, 0], push_word(U256::MAX), vec![KECCAK256, STOP]].concat();
        let result = execute(Revision::Cancun, &code, GAS);
        assert_eq!(result.status, StatusCode::Success);
    }

    #[test]
    fn test_gas_left_is_monotonic() {
        // a countdown loop that also touches memory
        let code = [
            PUSH1, 5, JUMPDEST, PUSH1, 1, SWAP1, SUB, DUP1, DUP1, MSTORE, DUP1, PUSH1, 2, JUMPI,
            STOP,
        ];
        let program = analyze(Revision::Cancun, &code);
        let message = message(GAS);
        let mut host = InMemoryHost::default();
        let mut vm = VM::new(&program, &message, &mut host);

        let mut previous = GAS;
        let mut steps = 0;
        while let Some(state) = vm.step() {
            assert!(state.gas_left <= previous);
            previous = state.gas_left;
            steps += 1;
        }
        assert_eq!(vm.status, Some(StatusCode::Success));
        assert_eq!(vm.result().gas_left, previous);
        assert!(steps > 5 * 8);
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval(&[push_word(U256::MAX), push(1), vec![ADD]].concat()), U256::ZERO);
        assert_eq!(eval(&[push(1), push(5), vec![SUB]].concat()), U256::from(4));
        assert_eq!(eval(&[push(0), push(5), vec![DIV]].concat()), U256::ZERO);
        assert_eq!(eval(&[push(0), push(5), vec![MOD]].concat()), U256::ZERO);
        assert_eq!(eval(&[push(3), push(2), push(2), vec![ADDMOD]].concat()), U256::from(1));
        assert_eq!(eval(&[push(0), push(5), push(5), vec![MULMOD]].concat()), U256::ZERO);
        assert_eq!(eval(&[push(3), push(2), vec![EXP]].concat()), U256::from(8));

        // -4 / 2 == -2
        let minus_four = U256::MAX - U256::from(3);
        let minus_two = U256::MAX - U256::from(1);
        assert_eq!(eval(&[push(2), push_word(minus_four), vec![SDIV]].concat()), minus_two);
        assert_eq!(eval(&[push(0xff), push(0), vec![SIGNEXTEND]].concat()), U256::MAX);
    }

    #[test]
    fn test_comparison_and_bitwise() {
        assert_eq!(eval(&[push(2), push(1), vec![LT]].concat()), U256::from(1));
        assert_eq!(eval(&[push(2), push(1), vec![GT]].concat()), U256::ZERO);
        assert_eq!(eval(&[push(1), push_word(U256::MAX), vec![SLT]].concat()), U256::from(1));
        assert_eq!(eval(&[push(0), vec![ISZERO]].concat()), U256::from(1));
        assert_eq!(eval(&[push(0), vec![NOT]].concat()), U256::MAX);
        assert_eq!(eval(&[push(0x1234), push(30), vec![BYTE]].concat()), U256::from(0x12));
        assert_eq!(eval(&[push(1), push(4), vec![SHL]].concat()), U256::from(16));
        assert_eq!(eval(&[push(16), push(4), vec![SHR]].concat()), U256::from(1));

        // -16 >> 2 == -4
        let minus_sixteen = U256::MAX - U256::from(15);
        let minus_four = U256::MAX - U256::from(3);
        assert_eq!(eval(&[push_word(minus_sixteen), push(2), vec![SAR]].concat()), minus_four);
    }

    #[test]
    fn test_keccak256_of_empty_input() {
        let hash = eval(&[push(0), push(0), vec![KECCAK256]].concat());
        assert_eq!(
            hash,
            U256::from_be_bytes(
                b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470").0
            )
        );
    }

    #[test]
    fn test_pc_msize_and_codesize() {
        assert_eq!(eval(&[PUSH1, 0, POP, PC]), U256::from(3));
        assert_eq!(eval(&[PUSH1, 1, PUSH1, 40, MSTORE8, MSIZE]), U256::from(64));
        assert_eq!(eval(&[CODESIZE]), U256::from(1 + ret_top().len()));
    }

    #[test]
    fn test_gas_reports_precise_value_mid_block() {
        let code = [vec![PUSH1, 0, POP, opcodes::GAS], ret_top()].concat();
        let result = execute(Revision::Cancun, &code, GAS);
        assert_eq!(U256::from_be_slice(&result.output), U256::from(GAS - 3 - 2 - 2));
    }

    #[test]
    fn test_calldata() {
        let mut host = InMemoryHost::default();
        let message = Message { input: Bytes::from_static(&[0xaa, 0xbb]), ..message(GAS) };

        let code = [vec![PUSH1, 1, CALLDATALOAD], ret_top()].concat();
        let result = execute_with(&mut host, &code, &message);
        let mut expected = [0u8; 32];
        expected[0] = 0xbb;
        assert_eq!(result.output.as_ref(), &expected);

        let code = [vec![CALLDATASIZE], ret_top()].concat();
        let result = execute_with(&mut host, &code, &message);
        assert_eq!(U256::from_be_slice(&result.output), U256::from(2));

        // CALLDATACOPY 4 bytes from offset 1 to memory 0: bb 00 00 00
        let code = [
            push(4),
            push(1),
            push(0),
            vec![CALLDATACOPY, PUSH1, 4, PUSH1, 0, RETURN],
        ]
        .concat();
        let result = execute_with(&mut host, &code, &message);
        assert_eq!(result.output, Bytes::from_static(&[0xbb, 0, 0, 0]));
    }

    #[test]
    fn test_returndatacopy_out_of_bounds() {
        let code = [push(1), push(0), push(0), vec![RETURNDATACOPY]].concat();
        let result = execute(Revision::Cancun, &code, GAS);
        assert_eq!(result.status, StatusCode::InvalidMemoryAccess);
        assert_eq!(result.gas_left, 0);

        let code = [push(0), push(0), push(0), vec![RETURNDATACOPY]].concat();
        assert_eq!(execute(Revision::Cancun, &code, GAS).status, StatusCode::Success);
    }

    #[test]
    fn test_opcode_availability_follows_revision() {
        let code = [PUSH0, STOP];
        assert_eq!(execute(Revision::Paris, &code, GAS).status, StatusCode::UndefinedInstruction);
        assert_eq!(execute(Revision::Shanghai, &code, GAS).status, StatusCode::Success);

        let code = [PUSH1, 1, PUSH1, 1, SHL];
        assert_eq!(
            execute(Revision::Byzantium, &code, GAS).status,
            StatusCode::UndefinedInstruction
        );
        assert_eq!(execute(Revision::Constantinople, &code, GAS).status, StatusCode::Success);
    }

    #[test]
    fn test_code_validation() {
        let result = execute(Revision::London, &[0xef, 0x00], GAS);
        assert_eq!(result.status, StatusCode::CodeValidationFailure);
        assert_eq!(result.gas_left, 0);

        let result = execute(Revision::Cancun, &vec![JUMPDEST; 0x6001], GAS);
        assert_eq!(result.status, StatusCode::CodeValidationFailure);
    }

    #[test]
    fn test_block_context() {
        let hash = b256!("00000000000000000000000000000000000000000000000000000000000000aa");
        let mut host = InMemoryHost::default();
        host.set_tx_context(TxContext {
            number: 300,
            chain_id: U256::from(1),
            blob_hashes: vec![hash],
            ..Default::default()
        });
        host.set_block_hash(299, hash);
        host.set_block_hash(10, hash);

        let word = |host: &mut InMemoryHost, code: Vec<u8>| {
            let result = execute_with(host, &[code, ret_top()].concat(), &message(GAS));
            U256::from_be_slice(&result.output)
        };

        assert_eq!(word(&mut host, vec![NUMBER]), U256::from(300));
        assert_eq!(word(&mut host, vec![CHAINID]), U256::from(1));
        assert_eq!(word(&mut host, [push(299), vec![BLOCKHASH]].concat()), U256::from(0xaa));
        assert_eq!(word(&mut host, [push(10), vec![BLOCKHASH]].concat()), U256::ZERO);
        assert_eq!(word(&mut host, [push(300), vec![BLOCKHASH]].concat()), U256::ZERO);
        assert_eq!(word(&mut host, [push(0), vec![BLOBHASH]].concat()), U256::from(0xaa));
        assert_eq!(word(&mut host, [push(1), vec![BLOBHASH]].concat()), U256::ZERO);
    }

    #[test]
    fn test_logs() {
        let code = [
            vec![PUSH1, 0xaa, PUSH1, 0, MSTORE8],
            push(0x77),
            push(1),
            push(0),
            vec![LOG1],
        ]
        .concat();
        let mut host = InMemoryHost::default();
        let result = execute_with(&mut host, &code, &message(GAS));
        assert_eq!(result.status, StatusCode::Success);

        let logs = host.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].address, CONTRACT);
        assert_eq!(logs[0].data, Bytes::from_static(&[0xaa]));
        assert_eq!(U256::from_be_bytes(logs[0].topics[0].0), U256::from(0x77));
    }

    #[test]
    fn test_transient_storage() {
        let code = [push(7), push(1), vec![TSTORE], push(1), vec![TLOAD], ret_top()].concat();
        let result = execute(Revision::Cancun, &code, GAS);
        assert_eq!(U256::from_be_slice(&result.output), U256::from(7));
    }
}
