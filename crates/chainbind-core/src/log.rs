//! The raw, undecoded log record as delivered by a log source.

use serde::{Deserialize, Serialize};

/// A raw EVM log entry. Produced by a log source; immutable once emitted.
///
/// `topics[0]` is the keccak256 hash of the event signature; subsequent
/// topics carry the indexed parameters. Non-indexed parameters are
/// ABI-encoded in `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLog {
    /// Contract address that emitted the log (0x-prefixed hex)
    pub address: String,
    /// topics[0] = event signature hash; topics[1..] = indexed params
    pub topics: Vec<String>,
    /// ABI-encoded non-indexed parameters
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
    /// Block number the log was included in
    pub block_number: u64,
    /// Hash of the containing block (0x-prefixed hex)
    pub block_hash: String,
    /// Hash of the originating transaction (0x-prefixed hex)
    pub tx_hash: String,
    /// Index of the transaction within the block
    pub tx_index: u32,
    /// Index of the log within the block
    pub log_index: u32,
    /// Whether the log was removed by a chain reorganisation
    #[serde(default)]
    pub removed: bool,
}

impl RawLog {
    /// Returns topics[0] — the event signature topic — if present.
    pub fn event_topic(&self) -> Option<&str> {
        self.topics.first().map(|s| s.as_str())
    }
}

/// Serialize log data as a 0x-prefixed hex string, the form it takes on the
/// wire in JSON-RPC payloads.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&format!("0x{}", hex::encode(data)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(de)?;
        let stripped = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(stripped).map_err(serde::de::Error::custom)
    }
}
