use super::strings::encode_hex;
use alloy::primitives::{Address, Bytes, B256, U256};

/// A convenience trait which encodes a given EVM type into a sized, `0x`-prefixed lowercase hex
/// string.
///
/// ```
/// use alloy::primitives::{Address, U256};
/// use bifrost_common::utils::hex::ToLowerHex;
///
/// assert_eq!(Address::repeat_byte(0xab).to_lower_hex(), format!("0x{}", "ab".repeat(20)));
/// assert_eq!(U256::from(1).to_lower_hex().len(), 66);
/// ```
pub trait ToLowerHex {
    /// Renders `self` as `0x`-prefixed lowercase hex.
    fn to_lower_hex(&self) -> String;
}

impl ToLowerHex for [u8] {
    fn to_lower_hex(&self) -> String {
        format!("0x{}", encode_hex(self))
    }
}

impl ToLowerHex for Vec<u8> {
    fn to_lower_hex(&self) -> String {
        self[..].to_lower_hex()
    }
}

impl ToLowerHex for Bytes {
    fn to_lower_hex(&self) -> String {
        self[..].to_lower_hex()
    }
}

impl ToLowerHex for U256 {
    fn to_lower_hex(&self) -> String {
        self.to_be_bytes::<32>()[..].to_lower_hex()
    }
}

impl ToLowerHex for B256 {
    fn to_lower_hex(&self) -> String {
        self.as_slice().to_lower_hex()
    }
}

impl ToLowerHex for Address {
    fn to_lower_hex(&self) -> String {
        self.as_slice().to_lower_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_is_left_padded() {
        let hex = U256::from(0x2a).to_lower_hex();
        assert_eq!(hex, format!("0x{}2a", "0".repeat(62)));
    }

    #[test]
    fn test_empty_bytes() {
        assert_eq!(Bytes::new().to_lower_hex(), "0x");
    }
}
