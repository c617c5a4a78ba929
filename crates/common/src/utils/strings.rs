use alloy::primitives::{hex, U256};
use eyre::{eyre, Result};

/// Decodes a hex string into a vector of bytes. A `0x` prefix and surrounding whitespace are
/// ignored.
///
/// ```
/// use bifrost_common::utils::strings::decode_hex;
///
/// let result = decode_hex("0x6001").expect("should decode hex");
/// assert_eq!(result, vec![0x60, 0x01]);
///
/// assert!(decode_hex("").expect("should decode hex").is_empty());
/// assert!(decode_hex("600").is_err());
/// ```
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);

    hex::decode(s).map_err(|e| eyre!("invalid hex string '{}': {}", s, e))
}

/// Encodes a slice of bytes into a lowercase hex string, without prefix
///
/// ```
/// use bifrost_common::utils::strings::encode_hex;
///
/// assert_eq!(encode_hex(&[0x60, 0x2a, 0x00]), "602a00");
/// ```
pub fn encode_hex(s: &[u8]) -> String {
    hex::encode(s)
}

/// Encodes a U256 into a hex string, removing leading zeros
///
/// ```
/// use alloy::primitives::U256;
/// use bifrost_common::utils::strings::encode_hex_reduced;
///
/// assert_eq!(encode_hex_reduced(U256::from(0x2a)), "0x2a");
/// assert_eq!(encode_hex_reduced(U256::ZERO), "0");
/// ```
pub fn encode_hex_reduced(s: U256) -> String {
    if s.is_zero() {
        return String::from("0");
    }
    format!("0x{}", encode_hex(&s.to_be_bytes::<32>()).trim_start_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hex_accepts_prefix_and_whitespace() {
        assert_eq!(decode_hex(" 0xdeadbeef\n").expect("valid hex"), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(decode_hex("DEADBEEF").expect("valid hex"), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_decode_hex_rejects_malformed_input() {
        assert!(decode_hex("0x6").is_err());
        assert!(decode_hex("zz").is_err());
    }

    #[test]
    fn test_encode_hex_reduced() {
        assert_eq!(encode_hex_reduced(U256::from(1)), "0x1");
        assert_eq!(
            encode_hex_reduced(U256::MAX),
            "0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
        );
    }
}
