//! The EVM ABI type and value model.
//!
//! Decoded values are normalized into `AbiValue` so binding code never deals
//! with alloy's dynamic value types directly. Integers wider than 128 bits
//! are carried as decimal strings; addresses as 0x-prefixed hex.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Description of a single Solidity ABI type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbiType {
    /// Unsigned integer (uint8 .. uint256). Width in bits.
    Uint(u16),
    /// Signed integer (int8 .. int256). Width in bits.
    Int(u16),
    Bool,
    /// Fixed-size byte array (bytes1 .. bytes32). Length in bytes.
    FixedBytes(u8),
    /// Variable-length byte array
    Bytes,
    /// UTF-8 string
    Str,
    /// 20-byte EVM address
    Address,
    /// Fixed-length array of a type
    Array { elem: Box<AbiType>, len: u64 },
    /// Variable-length array of a type
    Vec(Box<AbiType>),
    /// Tuple / struct, fields in declaration order
    Tuple(Vec<(String, AbiType)>),
}

impl fmt::Display for AbiType {
    /// Renders the canonical ABI type string, as used in event and function
    /// signatures (`uint256`, `address[]`, `(uint256,bool)`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::Bool => write!(f, "bool"),
            AbiType::FixedBytes(n) => write!(f, "bytes{n}"),
            AbiType::Bytes => write!(f, "bytes"),
            AbiType::Str => write!(f, "string"),
            AbiType::Address => write!(f, "address"),
            AbiType::Array { elem, len } => write!(f, "{elem}[{len}]"),
            AbiType::Vec(elem) => write!(f, "{elem}[]"),
            AbiType::Tuple(fields) => {
                let parts: Vec<_> = fields.iter().map(|(_, t)| t.to_string()).collect();
                write!(f, "({})", parts.join(","))
            }
        }
    }
}

/// A decoded ABI value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AbiValue {
    Uint(u128),
    /// Large uints (> u128) as decimal string
    BigUint(String),
    Int(i128),
    /// Large ints (> i128) as decimal string
    BigInt(String),
    Bool(bool),
    Bytes(Vec<u8>),
    Str(String),
    /// 0x-prefixed hex, EIP-55 checksummed where produced by the codec
    Address(String),
    Array(Vec<AbiValue>),
    Tuple(Vec<(String, AbiValue)>),
}

impl AbiValue {
    /// Returns the inner string if this is an Address value.
    pub fn as_address(&self) -> Option<&str> {
        match self {
            AbiValue::Address(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Coerce to a u128 if this is a small Uint.
    pub fn as_u128(&self) -> Option<u128> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Coerce to a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the inner string if this is a Str value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Uint(v) => write!(f, "{v}"),
            AbiValue::BigUint(v) => write!(f, "{v}"),
            AbiValue::Int(v) => write!(f, "{v}"),
            AbiValue::BigInt(v) => write!(f, "{v}"),
            AbiValue::Bool(v) => write!(f, "{v}"),
            AbiValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            AbiValue::Str(s) => write!(f, "{s}"),
            AbiValue::Address(a) => write!(f, "{a}"),
            AbiValue::Array(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            AbiValue::Tuple(fields) => {
                let parts: Vec<_> = fields.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}
