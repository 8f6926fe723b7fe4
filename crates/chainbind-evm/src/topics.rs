//! Event signature topics and function selectors.
//!
//! The topic of an EVM event is the keccak256 hash of its canonical
//! signature string, e.g.:
//!   keccak256("GGPPriceUpdated(uint256,uint256)")
//!   → 0x1826f74860bd5ff97bcab2245acae00a635acaa3dbc72e5c68b83ff34b1fac00
//! A function selector is the first four bytes of the same hash over the
//! function signature.

use alloy_primitives::U256;
use tiny_keccak::{Hasher, Keccak};

fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(input);
    hasher.finalize(&mut output);
    output
}

/// Compute the 0x-prefixed signature topic of a canonical event signature,
/// `"EventName(type1,type2,...)"`.
pub fn event_topic(signature: &str) -> String {
    format!("0x{}", hex::encode(keccak256(signature.as_bytes())))
}

/// Compute the 4-byte call selector of a canonical function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encode a uint256 value as a 32-byte topic for use in an indexed-value
/// filter position.
pub fn topic_u256(value: U256) -> String {
    format!("0x{}", hex::encode(value.to_be_bytes::<32>()))
}

/// Encode a 20-byte address as a 32-byte (left-padded) topic.
/// Returns `None` if the input is not a valid address hex string.
pub fn topic_address(address: &str) -> Option<String> {
    let stripped = address.strip_prefix("0x").unwrap_or(address);
    let bytes = hex::decode(stripped).ok()?;
    if bytes.len() != 20 {
        return None;
    }
    let mut padded = [0u8; 32];
    padded[12..].copy_from_slice(&bytes);
    Some(format!("0x{}", hex::encode(padded)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erc20_transfer_topic() {
        assert_eq!(
            event_topic("Transfer(address,address,uint256)"),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn oracle_price_updated_topic() {
        assert_eq!(
            event_topic("GGPPriceUpdated(uint256,uint256)"),
            "0x1826f74860bd5ff97bcab2245acae00a635acaa3dbc72e5c68b83ff34b1fac00"
        );
    }

    #[test]
    fn known_selectors() {
        assert_eq!(selector("getContractAddress(string)"), [0x04, 0x43, 0x3b, 0xbc]);
        assert_eq!(selector("getGGPPriceInAVAX()"), [0x78, 0xe8, 0x65, 0xfe]);
        assert_eq!(selector("getGGPPriceInAVAXFromOneInch()"), [0x4c, 0x97, 0xe7, 0x85]);
        assert_eq!(selector("setGGPPriceInAVAX(uint256,uint256)"), [0x87, 0xda, 0x92, 0x5e]);
        assert_eq!(selector("setOneInch(address)"), [0xa4, 0x1b, 0xfc, 0x6a]);
        assert_eq!(selector("version()"), [0x54, 0xfd, 0x4d, 0x50]);
    }

    #[test]
    fn topic_u256_padding() {
        assert_eq!(
            topic_u256(U256::from(100u64)),
            "0x0000000000000000000000000000000000000000000000000000000000000064"
        );
    }

    #[test]
    fn topic_address_padding() {
        let t = topic_address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045").unwrap();
        assert_eq!(
            t,
            "0x000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045"
        );
        assert!(topic_address("0x1234").is_none());
    }
}
