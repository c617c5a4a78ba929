//! Helpers for assembling EVM bytecode by hand, mostly in tests and benchmarks.
//!
//! ```
//! use bifrost_common::utils::bytecode::{push, repeat, ret_top};
//!
//! // PUSH1 0x2a, then return it as a 32-byte word
//! let code = [push(0x2a), ret_top()].concat();
//! assert_eq!(code[..2], [0x60, 0x2a]);
//!
//! assert_eq!(repeat(&[0x60, 0x00, 0x50], 2), [0x60, 0x00, 0x50, 0x60, 0x00, 0x50]);
//! ```

use alloy::primitives::U256;

const MSTORE: u8 = 0x52;
const PUSH1: u8 = 0x60;
const RETURN: u8 = 0xf3;

/// The shortest `PUSHn` of `value`. Zero is pushed as `PUSH1 0x00` so the result is valid in
/// every revision.
///
/// ```
/// use bifrost_common::utils::bytecode::push;
///
/// assert_eq!(push(0), [0x60, 0x00]);
/// assert_eq!(push(0x1234), [0x61, 0x12, 0x34]);
/// ```
pub fn push(value: u64) -> Vec<u8> {
    push_word(U256::from(value))
}

/// The shortest `PUSHn` of a full word.
pub fn push_word(value: U256) -> Vec<u8> {
    let bytes = value.to_be_bytes::<32>();
    let start = bytes.iter().position(|byte| *byte != 0).unwrap_or(31);
    push_n(32 - start, &bytes[start..])
}

/// `PUSHn` with `bytes` left-padded with zeros to `n` bytes.
///
/// # Panics
///
/// Panics unless `1 <= n <= 32` and `bytes` fits in `n` bytes.
///
/// ```
/// use bifrost_common::utils::bytecode::push_n;
///
/// assert_eq!(push_n(3, &[0xff]), [0x62, 0x00, 0x00, 0xff]);
/// ```
pub fn push_n(n: usize, bytes: &[u8]) -> Vec<u8> {
    assert!((1..=32).contains(&n), "PUSH{n} does not exist");
    assert!(bytes.len() <= n, "{} bytes do not fit in PUSH{n}", bytes.len());

    let mut code = Vec::with_capacity(n + 1);
    code.push(PUSH1 + (n - 1) as u8);
    code.resize(1 + n - bytes.len(), 0);
    code.extend_from_slice(bytes);
    code
}

/// `code` concatenated `n` times.
pub fn repeat(code: &[u8], n: usize) -> Vec<u8> {
    code.repeat(n)
}

/// Stores `value` at memory `offset`: `PUSH offset MSTORE`, with the value already on the stack.
pub fn mstore(offset: u64) -> Vec<u8> {
    [push(offset), vec![MSTORE]].concat()
}

/// Returns the top stack item as a 32-byte word: `PUSH1 0 MSTORE PUSH1 32 PUSH1 0 RETURN`.
pub fn ret_top() -> Vec<u8> {
    [mstore(0), push(32), push(0), vec![RETURN]].concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_picks_shortest_width() {
        assert_eq!(push(0xff), [0x60, 0xff]);
        assert_eq!(push(0x100), [0x61, 0x01, 0x00]);
        assert_eq!(push(u64::MAX), [vec![0x67], vec![0xff; 8]].concat());
    }

    #[test]
    fn test_push_word() {
        let code = push_word(U256::MAX);
        assert_eq!(code[0], 0x7f);
        assert_eq!(code.len(), 33);
        assert_eq!(push_word(U256::ZERO), [0x60, 0x00]);
    }

    #[test]
    #[should_panic]
    fn test_push_n_rejects_oversized_immediate() {
        push_n(1, &[1, 2]);
    }

    #[test]
    fn test_ret_top() {
        assert_eq!(ret_top(), [0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3]);
        assert_eq!(mstore(0x40), [0x60, 0x40, 0x52]);
    }
}
