//! Integration tests for nested frames: calls, creations, storage metering and self-destruction
//! against the in-memory host.

#[cfg(test)]
mod integration_tests {
    use alloy::primitives::{Address, Bytes, B256, U256};
    use bifrost_common::utils::bytecode::{push, push_n, ret_top};
    use bifrost_vm::{
        core::{
            message::{CallKind, Message},
            opcodes::{self, *},
            revision::Revision,
            status::StatusCode,
            vm::ExecutionResult,
            word::address_to_word,
        },
        ext::host::InMemoryHost,
    };

    const SENDER: Address = Address::repeat_byte(0x0a);
    const CALLER: Address = Address::repeat_byte(0xaa);
    const CALLEE: Address = Address::repeat_byte(0xbb);
    const GAS: i64 = 1_000_000;

    fn message(gas: i64) -> Message {
        Message {
            gas,
            sender: SENDER,
            recipient: CALLER,
            code_address: CALLER,
            ..Default::default()
        }
    }

    fn transact(host: &mut InMemoryHost, code: Vec<u8>) -> ExecutionResult {
        host.set_code(CALLER, code);
        host.transact(&message(GAS))
    }

    /// `opcode` with zeroed in/out regions, `value` for CALL and CALLCODE, and `out_size` bytes
    /// of output copied to memory offset zero.
    fn call(opcode: u8, target: Address, value: Option<u64>, out_size: u64) -> Vec<u8> {
        let mut code = [push(out_size), push(0), push(0), push(0)].concat();
        if let Some(value) = value {
            code.extend(push(value));
        }
        code.extend(push_n(20, target.as_slice()));
        code.extend(push(0xffff));
        code.push(opcode);
        code
    }

    fn word(output: &Bytes) -> U256 {
        U256::from_be_slice(output)
    }

    #[test]
    fn test_call_returns_callee_output() {
        let mut host = InMemoryHost::default();
        host.set_code(CALLEE, [push(42), ret_top()].concat());

        let code = [call(CALL, CALLEE, Some(0), 32), vec![POP, PUSH1, 32, PUSH1, 0, RETURN]].concat();
        let result = transact(&mut host, code);
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(word(&result.output), U256::from(42));

        let calls = host.recorded_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].depth, 1);
        assert_eq!(calls[1].sender, CALLER);
        assert_eq!(calls[1].recipient, CALLEE);
        assert_eq!(calls[1].gas, 0xffff);
    }

    #[test]
    fn test_returndata_follows_last_call() {
        let mut host = InMemoryHost::default();
        host.set_code(CALLEE, [push(42), ret_top()].concat());

        let code = [call(CALL, CALLEE, Some(0), 0), vec![POP, RETURNDATASIZE], ret_top()].concat();
        let result = transact(&mut host, code);
        assert_eq!(word(&result.output), U256::from(32));
    }

    #[test]
    fn test_call_at_depth_limit_pushes_zero() {
        let mut host = InMemoryHost::default();
        let code = [call(CALL, CALLEE, Some(0), 0), ret_top()].concat();
        host.set_code(CALLER, code);

        let result = host.transact(&Message { depth: 1024, ..message(GAS) });
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(word(&result.output), U256::ZERO);
        assert_eq!(host.recorded_calls().len(), 1);

        let result = host.transact(&message(GAS));
        assert_eq!(word(&result.output), U256::from(1));
    }

    #[test]
    fn test_self_recursion_reaches_depth_limit() {
        // each frame calls itself with all its gas and returns the child's output plus its own
        // call outcome
        let code = [
            push(32),
            push(0),
            push(0),
            push(0),
            push(0),
            push_n(20, CALLER.as_slice()),
            vec![opcodes::GAS, CALL, PUSH1, 0, MLOAD, ADD],
            ret_top(),
        ]
        .concat();
        let mut host = InMemoryHost::new(Revision::Cancun);
        host.set_code(CALLER, code);

        let result = host.transact(&message(i64::MAX / 2));
        assert_eq!(result.status, StatusCode::Success);

        // the frame at depth 1024 cannot call, pushes 0 and still returns
        assert_eq!(word(&result.output), U256::from(1024));

        let calls = host.recorded_calls();
        assert_eq!(calls.len(), 1025);
        assert_eq!(calls.iter().map(|call| call.depth).max(), Some(1024));
        assert_eq!(host.open_frames(), 0);
    }

    #[test]
    fn test_static_call_forbids_state_changes() {
        let mut host = InMemoryHost::default();
        host.set_code(CALLEE, vec![PUSH1, 1, PUSH1, 0, SSTORE]);

        let result = transact(&mut host, [call(STATICCALL, CALLEE, None, 0), ret_top()].concat());
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(word(&result.output), U256::ZERO);
        assert_eq!(host.storage(&CALLEE, U256::ZERO), U256::ZERO);
        assert!(host.recorded_calls()[1].is_static);
    }

    #[test]
    fn test_static_frame_rejects_sstore() {
        let mut host = InMemoryHost::default();
        host.set_code(CALLER, vec![PUSH1, 1, PUSH1, 0, SSTORE]);

        let result = host.transact(&Message { is_static: true, ..message(GAS) });
        assert_eq!(result.status, StatusCode::StaticModeViolation);
        assert_eq!(result.gas_left, 0);
    }

    #[test]
    fn test_delegatecall_keeps_context() {
        let mut host = InMemoryHost::default();
        host.set_code(CALLEE, vec![opcodes::CALLER, PUSH1, 0, SSTORE]);

        let result = transact(&mut host, [call(DELEGATECALL, CALLEE, None, 0), vec![STOP]].concat());
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(host.storage(&CALLER, U256::ZERO), address_to_word(SENDER));
        assert_eq!(host.storage(&CALLEE, U256::ZERO), U256::ZERO);
    }

    #[test]
    fn test_value_transfer() {
        let mut host = InMemoryHost::default();
        host.set_balance(CALLER, U256::from(10));

        let result = transact(&mut host, [call(CALL, CALLEE, Some(3), 0), ret_top()].concat());
        assert_eq!(word(&result.output), U256::from(1));
        assert_eq!(host.account(&CALLER).map(|account| account.balance), Some(U256::from(7)));
        assert_eq!(host.account(&CALLEE).map(|account| account.balance), Some(U256::from(3)));

        // not enough balance: no frame is entered
        let result = transact(&mut host, [call(CALL, CALLEE, Some(8), 0), ret_top()].concat());
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(word(&result.output), U256::ZERO);
        assert_eq!(host.recorded_calls().len(), 3);
    }

    #[test]
    fn test_value_call_in_static_frame() {
        let mut host = InMemoryHost::default();
        host.set_code(CALLER, call(CALL, CALLEE, Some(1), 0));

        let result = host.transact(&Message { is_static: true, ..message(GAS) });
        assert_eq!(result.status, StatusCode::StaticModeViolation);
    }

    #[test]
    fn test_reverted_call_rolls_back_state() {
        let mut host = InMemoryHost::default();
        host.set_code(CALLEE, vec![PUSH1, 1, PUSH1, 0, SSTORE, PUSH1, 0, PUSH1, 0, REVERT]);

        let result = transact(&mut host, [call(CALL, CALLEE, Some(0), 0), ret_top()].concat());
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(word(&result.output), U256::ZERO);
        assert_eq!(host.storage(&CALLEE, U256::ZERO), U256::ZERO);
    }

    #[test]
    fn test_failed_call_consumes_forwarded_gas() {
        let mut host = InMemoryHost::default();
        host.set_code(CALLEE, vec![INVALID]);

        let code = [call(CALL, CALLEE, Some(0), 0), vec![STOP]].concat();
        let result = transact(&mut host, code.clone());
        assert_eq!(result.status, StatusCode::Success);

        host.set_code(CALLEE, vec![STOP]);
        let cheap = transact(&mut host, code);
        assert_eq!(result.gas_left, cheap.gas_left - 0xffff);
    }

    /// Init code deploying the single byte `00`.
    const INIT_CODE: [u8; 10] = [PUSH1, 0, PUSH1, 0, MSTORE8, PUSH1, 1, PUSH1, 0, RETURN];

    /// Stores `INIT_CODE` right-aligned in the first memory word.
    fn store_init_code() -> Vec<u8> {
        [push_n(10, &INIT_CODE), vec![PUSH1, 0, MSTORE]].concat()
    }

    #[test]
    fn test_create() {
        let mut host = InMemoryHost::default();
        let code = [store_init_code(), push(10), push(22), push(0), vec![CREATE], ret_top()].concat();

        let result = transact(&mut host, code);
        assert_eq!(result.status, StatusCode::Success);

        let created = CALLER.create(0);
        assert_eq!(word(&result.output), address_to_word(created));
        assert_eq!(host.account(&CALLER).map(|account| account.nonce), Some(1));

        let account = host.account(&created).expect("created account");
        assert_eq!(account.code, Bytes::from_static(&[0x00]));
        assert_eq!(account.nonce, 1);

        let frame = &host.recorded_calls()[1];
        assert_eq!(frame.kind, CallKind::Create);
        assert_eq!(frame.input, Bytes::from_static(&INIT_CODE));
    }

    #[test]
    fn test_create2() {
        let mut host = InMemoryHost::default();
        let code = [
            store_init_code(),
            push(7),
            push(10),
            push(22),
            push(0),
            vec![CREATE2],
            ret_top(),
        ]
        .concat();

        let result = transact(&mut host, code);
        let created = CALLER.create2_from_code(B256::with_last_byte(7).0, INIT_CODE);
        assert_eq!(word(&result.output), address_to_word(created));
        assert!(host.account(&created).is_some_and(|account| !account.code.is_empty()));
    }

    #[test]
    fn test_failed_create_keeps_nonce_bump() {
        let mut host = InMemoryHost::default();
        let init = [PUSH1, 0, PUSH1, 0, REVERT];
        let code = [
            push_n(5, &init),
            vec![PUSH1, 0, MSTORE],
            push(5),
            push(27),
            push(0),
            vec![CREATE],
            ret_top(),
        ]
        .concat();

        let result = transact(&mut host, code);
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(word(&result.output), U256::ZERO);
        assert_eq!(host.account(&CALLER).map(|account| account.nonce), Some(1));
        assert!(host.account(&CALLER.create(0)).is_none());
    }

    #[test]
    fn test_create_in_static_frame() {
        let mut host = InMemoryHost::default();
        host.set_code(CALLER, vec![PUSH1, 0, PUSH1, 0, PUSH1, 0, CREATE]);

        let result = host.transact(&Message { is_static: true, ..message(GAS) });
        assert_eq!(result.status, StatusCode::StaticModeViolation);
    }

    #[test]
    fn test_sstore_costs_and_refunds() {
        let store = |value: u64| [push(value), push(0), vec![SSTORE]].concat();

        // fresh slot, cold: 20000 + 2100
        let mut host = InMemoryHost::new(Revision::Cancun);
        let result = transact(&mut host, store(1));
        assert_eq!(result.gas_used(GAS), 3 + 3 + 22100);
        assert_eq!(result.gas_refund, 0);

        // clearing a committed slot refunds
        let mut host = InMemoryHost::new(Revision::Cancun);
        host.insert_storage(CALLER, U256::ZERO, U256::from(1));
        let result = transact(&mut host, store(0));
        assert_eq!(result.gas_used(GAS), 3 + 3 + 2900 + 2100);
        assert_eq!(result.gas_refund, 4800);

        // no access lists before Berlin
        let mut host = InMemoryHost::new(Revision::Istanbul);
        let result = transact(&mut host, store(1));
        assert_eq!(result.gas_used(GAS), 3 + 3 + 20000);

        let mut host = InMemoryHost::new(Revision::Frontier);
        host.insert_storage(CALLER, U256::ZERO, U256::from(1));
        let result = transact(&mut host, store(0));
        assert_eq!(result.gas_used(GAS), 3 + 3 + 5000);
        assert_eq!(result.gas_refund, 15000);
    }

    #[test]
    fn test_sstore_requires_more_than_stipend() {
        let code = vec![PUSH1, 0, PUSH1, 0, SSTORE];

        let mut host = InMemoryHost::new(Revision::Istanbul);
        host.set_code(CALLER, code.clone());
        let result = host.transact(&message(2306));
        assert_eq!(result.status, StatusCode::OutOfGas);

        let result = host.transact(&message(2307));
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(result.gas_left, 2307 - 6 - 800);

        // no sentry before Istanbul
        let mut host = InMemoryHost::new(Revision::Petersburg);
        host.set_code(CALLER, code);
        let result = host.transact(&message(5006));
        assert_eq!(result.status, StatusCode::Success);
    }

    #[test]
    fn test_sload_warms_slot() {
        let code = [push(0), vec![SLOAD, POP], push(0), vec![SLOAD, POP]].concat();
        let mut host = InMemoryHost::new(Revision::Cancun);
        let result = transact(&mut host, code);
        assert_eq!(result.gas_used(GAS), 2 * (3 + 100 + 2) + 2000);
    }

    #[test]
    fn test_selfdestruct() {
        let beneficiary = Address::repeat_byte(0xee);
        let mut host = InMemoryHost::new(Revision::Cancun);
        host.set_balance(CALLER, U256::from(5));

        let result = transact(&mut host, [push_n(20, beneficiary.as_slice()), vec![SELFDESTRUCT]].concat());
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(result.gas_used(GAS), 3 + 5000 + 2600 + 25000);
        assert_eq!(result.gas_refund, 0);
        assert_eq!(host.selfdestructs(), &[(CALLER, beneficiary)]);
        assert_eq!(host.account(&beneficiary).map(|account| account.balance), Some(U256::from(5)));
    }

    #[test]
    fn test_selfdestruct_cold_beneficiary_from_berlin() {
        let beneficiary = Address::repeat_byte(0xee);
        let code = [push_n(20, beneficiary.as_slice()), vec![SELFDESTRUCT]].concat();

        let mut host = InMemoryHost::new(Revision::Istanbul);
        assert_eq!(transact(&mut host, code.clone()).gas_used(GAS), 3 + 5000);

        let mut host = InMemoryHost::new(Revision::Berlin);
        assert_eq!(transact(&mut host, code).gas_used(GAS), 3 + 5000 + 2600);
    }

    #[test]
    fn test_selfdestruct_refund_before_london() {
        let mut host = InMemoryHost::new(Revision::Berlin);
        let result = transact(&mut host, [push_n(20, CALLER.as_slice()), vec![SELFDESTRUCT]].concat());
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(result.gas_refund, 24000);
    }
}
