//! Benchmark for jump-heavy code: a countdown loop that stores every counter in memory.

use bifrost_common::utils::bytecode::push;
use bifrost_vm::{
    core::{message::Message, opcodes::*, revision::Revision, vm::Interpreter},
    ext::host::InMemoryHost,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn countdown(iterations: u64) -> Vec<u8> {
    let start = push(iterations);
    let head = start.len() as u8;
    [start, vec![JUMPDEST, PUSH1, 1, SWAP1, SUB, DUP1, DUP1, MSTORE, DUP1, PUSH1, head, JUMPI, STOP]]
        .concat()
}

fn bench_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute/loop");
    let message = Message { gas: i64::MAX, ..Default::default() };

    for iterations in [1_000u64, 100_000] {
        let code = countdown(iterations);
        let interpreter = Interpreter::default();

        group.bench_with_input(BenchmarkId::from_parameter(iterations), &code, |b, code| {
            b.iter(|| {
                let mut host = InMemoryHost::default();
                let result = interpreter.execute(&mut host, Revision::Cancun, &message, code);
                assert!(result.status.is_success());
                result.gas_left
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_loop);
criterion_main!(benches);
