//! Helpers for 256-bit words.
//!
//! [`U256`] already provides wrapping unsigned arithmetic. The helpers here add the
//! two's-complement interpretation used by the signed opcodes, plus conversions between words,
//! addresses and hashes.

use alloy::primitives::{Address, B256, U256};

/// Returns true if the word is negative when read as a two's-complement integer.
#[inline]
pub fn is_negative(value: U256) -> bool {
    value.bit(255)
}

/// Two's-complement magnitude of a word.
#[inline]
fn abs(value: U256) -> U256 {
    if is_negative(value) {
        value.wrapping_neg()
    } else {
        value
    }
}

/// Signed division, rounding toward zero. Division by zero yields zero.
///
/// ```
/// use alloy::primitives::U256;
/// use bifrost_vm::core::word::sdiv;
///
/// let minus_ten = U256::from(10).wrapping_neg();
/// assert_eq!(sdiv(minus_ten, U256::from(3)), U256::from(3).wrapping_neg());
/// assert_eq!(sdiv(minus_ten, U256::ZERO), U256::ZERO);
/// ```
pub fn sdiv(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::ZERO;
    }

    let quotient = abs(a) / abs(b);
    if is_negative(a) != is_negative(b) {
        quotient.wrapping_neg()
    } else {
        quotient
    }
}

/// Signed modulo. The result takes the sign of the dividend. Modulo zero yields zero.
pub fn smod(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::ZERO;
    }

    let remainder = abs(a) % abs(b);
    if is_negative(a) {
        remainder.wrapping_neg()
    } else {
        remainder
    }
}

/// Signed less-than.
#[inline]
pub fn slt(a: U256, b: U256) -> bool {
    match (is_negative(a), is_negative(b)) {
        (true, false) => true,
        (false, true) => false,
        _ => a < b,
    }
}

/// Signed greater-than.
#[inline]
pub fn sgt(a: U256, b: U256) -> bool {
    slt(b, a)
}

/// Arithmetic right shift of `value` by `shift` bits.
///
/// ```
/// use alloy::primitives::U256;
/// use bifrost_vm::core::word::sar;
///
/// assert_eq!(sar(U256::from(1), U256::from(16)), U256::from(8));
/// assert_eq!(sar(U256::from(300), U256::MAX), U256::MAX);
/// ```
pub fn sar(shift: U256, value: U256) -> U256 {
    let negative = is_negative(value);
    if shift >= U256::from(256) {
        return if negative { U256::MAX } else { U256::ZERO };
    }

    let shift = shift.as_limbs()[0] as usize;
    if negative {
        !(!value >> shift)
    } else {
        value >> shift
    }
}

/// Logical left shift, zero for shifts of 256 bits or more.
#[inline]
pub fn shl(shift: U256, value: U256) -> U256 {
    if shift >= U256::from(256) {
        U256::ZERO
    } else {
        value << (shift.as_limbs()[0] as usize)
    }
}

/// Logical right shift, zero for shifts of 256 bits or more.
#[inline]
pub fn shr(shift: U256, value: U256) -> U256 {
    if shift >= U256::from(256) {
        U256::ZERO
    } else {
        value >> (shift.as_limbs()[0] as usize)
    }
}

/// Extends the sign of the two's-complement integer stored in the low `byte_index + 1` bytes.
///
/// ```
/// use alloy::primitives::U256;
/// use bifrost_vm::core::word::signextend;
///
/// assert_eq!(signextend(U256::ZERO, U256::from(0xff)), U256::MAX);
/// assert_eq!(signextend(U256::ZERO, U256::from(0x7f)), U256::from(0x7f));
/// ```
pub fn signextend(byte_index: U256, value: U256) -> U256 {
    if byte_index >= U256::from(31) {
        return value;
    }

    let bit = byte_index.as_limbs()[0] as usize * 8 + 7;
    let mask = (U256::from(1) << (bit + 1)) - U256::from(1);
    if value.bit(bit) {
        value | !mask
    } else {
        value & mask
    }
}

/// The `index`-th byte of `value`, counting from the most significant byte.
#[inline]
pub fn byte(index: U256, value: U256) -> U256 {
    if index >= U256::from(32) {
        return U256::ZERO;
    }
    U256::from(value.byte(31 - index.as_limbs()[0] as usize))
}

/// Number of significant bytes in `value`.
#[inline]
pub fn byte_len(value: U256) -> usize {
    value.bit_len().div_ceil(8)
}

/// Clamps a word to `u64`, saturating at [`u64::MAX`].
#[inline]
pub fn saturating_u64(value: U256) -> u64 {
    let limbs = value.as_limbs();
    if limbs[1] != 0 || limbs[2] != 0 || limbs[3] != 0 {
        u64::MAX
    } else {
        limbs[0]
    }
}

/// Clamps a word to `usize`, saturating at [`usize::MAX`].
#[inline]
pub fn saturating_usize(value: U256) -> usize {
    usize::try_from(saturating_u64(value)).unwrap_or(usize::MAX)
}

/// The low 160 bits of a word as an address.
#[inline]
pub fn word_to_address(value: U256) -> Address {
    Address::from_word(word_to_b256(value))
}

/// An address as a left-padded word.
#[inline]
pub fn address_to_word(address: Address) -> U256 {
    U256::from_be_bytes(address.into_word().0)
}

/// A word as 32 big-endian bytes.
#[inline]
pub fn word_to_b256(value: U256) -> B256 {
    B256::from(value.to_be_bytes::<32>())
}

/// 32 big-endian bytes as a word.
#[inline]
pub fn b256_to_word(value: B256) -> U256 {
    U256::from_be_bytes(value.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neg(value: u64) -> U256 {
        U256::from(value).wrapping_neg()
    }

    #[test]
    fn test_sdiv_min_by_minus_one() {
        let min = U256::from(1) << 255;
        assert_eq!(sdiv(min, U256::MAX), min);
    }

    #[test]
    fn test_sdiv_signs() {
        assert_eq!(sdiv(neg(10), neg(2)), U256::from(5));
        assert_eq!(sdiv(U256::from(10), neg(2)), neg(5));
        assert_eq!(sdiv(U256::from(7), U256::from(2)), U256::from(3));
    }

    #[test]
    fn test_smod_takes_dividend_sign() {
        assert_eq!(smod(neg(8), U256::from(3)), neg(2));
        assert_eq!(smod(U256::from(8), neg(3)), U256::from(2));
        assert_eq!(smod(U256::from(8), U256::ZERO), U256::ZERO);
    }

    #[test]
    fn test_signed_comparisons() {
        assert!(slt(neg(1), U256::from(1)));
        assert!(!slt(U256::from(1), neg(1)));
        assert!(sgt(U256::from(1), neg(1)));
        assert!(slt(neg(2), neg(1)));
    }

    #[test]
    fn test_shifts() {
        assert_eq!(shl(U256::from(1), U256::from(1)), U256::from(2));
        assert_eq!(shl(U256::from(256), U256::from(1)), U256::ZERO);
        assert_eq!(shr(U256::from(4), U256::from(0xff)), U256::from(0x0f));
        assert_eq!(shr(U256::MAX, U256::MAX), U256::ZERO);
        assert_eq!(sar(U256::from(4), neg(16)), neg(1));
        assert_eq!(sar(U256::from(1000), U256::from(1)), U256::ZERO);
    }

    #[test]
    fn test_signextend() {
        assert_eq!(signextend(U256::from(1), U256::from(0x8000)), neg(0x8000));
        assert_eq!(signextend(U256::from(1), U256::from(0x12_7fff)), U256::from(0x7fff));
        assert_eq!(signextend(U256::from(40), U256::from(0xff)), U256::from(0xff));
    }

    #[test]
    fn test_byte() {
        let value = U256::from(0x1234);
        assert_eq!(byte(U256::from(31), value), U256::from(0x34));
        assert_eq!(byte(U256::from(30), value), U256::from(0x12));
        assert_eq!(byte(U256::from(0), value), U256::ZERO);
        assert_eq!(byte(U256::from(32), value), U256::ZERO);
    }

    #[test]
    fn test_byte_len_and_saturation() {
        assert_eq!(byte_len(U256::ZERO), 0);
        assert_eq!(byte_len(U256::from(0x100)), 2);
        assert_eq!(saturating_u64(U256::MAX), u64::MAX);
        assert_eq!(saturating_u64(U256::from(42)), 42);
    }

    #[test]
    fn test_address_conversion() {
        let address = Address::repeat_byte(0xaa);
        let word = address_to_word(address);
        assert_eq!(word >> 160, U256::ZERO);
        assert_eq!(word_to_address(word), address);
        assert_eq!(word_to_address(word | (U256::from(1) << 200)), address);
    }
}
