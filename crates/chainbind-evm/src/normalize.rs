//! Conversions between alloy's `DynSolValue` and the `AbiValue` model.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, FixedBytes, I256, U256};
use chainbind_core::{AbiType, AbiValue, DecodeError};
use std::str::FromStr;

/// Convert a decoded `DynSolValue` into an `AbiValue`.
pub fn from_dyn(val: DynSolValue) -> AbiValue {
    match val {
        DynSolValue::Bool(b) => AbiValue::Bool(b),

        DynSolValue::Int(i, bits) => {
            if bits <= 128 {
                match i128::try_from(i) {
                    Ok(v) => AbiValue::Int(v),
                    Err(_) => AbiValue::BigInt(i.to_string()),
                }
            } else {
                AbiValue::BigInt(i.to_string())
            }
        }

        DynSolValue::Uint(u, bits) => {
            if bits <= 128 {
                match u128::try_from(u) {
                    Ok(v) => AbiValue::Uint(v),
                    Err(_) => AbiValue::BigUint(u.to_string()),
                }
            } else {
                AbiValue::BigUint(u.to_string())
            }
        }

        DynSolValue::FixedBytes(bytes, size) => AbiValue::Bytes(bytes[..size].to_vec()),

        DynSolValue::Bytes(b) => AbiValue::Bytes(b),

        DynSolValue::String(s) => AbiValue::Str(s),

        // EIP-55 checksum encoding
        DynSolValue::Address(a) => AbiValue::Address(a.to_checksum(None)),

        DynSolValue::Array(vals) | DynSolValue::FixedArray(vals) => {
            AbiValue::Array(vals.into_iter().map(from_dyn).collect())
        }

        DynSolValue::Tuple(fields) => {
            // Unnamed tuple fields get positional names "0", "1", ...
            let named: Vec<(String, AbiValue)> = fields
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), from_dyn(v)))
                .collect();
            AbiValue::Tuple(named)
        }

        DynSolValue::Function(f) => AbiValue::Bytes(f.to_vec()),
    }
}

/// Build an alloy `DynSolType` from an `AbiType`.
pub fn type_to_dyn(ty: &AbiType) -> Result<DynSolType, DecodeError> {
    match ty {
        AbiType::Uint(bits) => Ok(DynSolType::Uint(*bits as usize)),
        AbiType::Int(bits) => Ok(DynSolType::Int(*bits as usize)),
        AbiType::Bool => Ok(DynSolType::Bool),
        AbiType::FixedBytes(n) => Ok(DynSolType::FixedBytes(*n as usize)),
        AbiType::Bytes => Ok(DynSolType::Bytes),
        AbiType::Str => Ok(DynSolType::String),
        AbiType::Address => Ok(DynSolType::Address),
        AbiType::Array { elem, len } => {
            let inner = type_to_dyn(elem)?;
            Ok(DynSolType::FixedArray(Box::new(inner), *len as usize))
        }
        AbiType::Vec(elem) => {
            let inner = type_to_dyn(elem)?;
            Ok(DynSolType::Array(Box::new(inner)))
        }
        AbiType::Tuple(fields) => {
            let types: Result<Vec<DynSolType>, _> =
                fields.iter().map(|(_, t)| type_to_dyn(t)).collect();
            Ok(DynSolType::Tuple(types?))
        }
    }
}

/// Convert an `AbiValue` into the `DynSolValue` required by the expected type.
pub fn to_dyn(val: &AbiValue, expected: &DynSolType) -> Result<DynSolValue, DecodeError> {
    let mismatch = || DecodeError::TypeMismatch {
        expected: format!("{expected:?}"),
        got: format!("{val}"),
    };

    match (val, expected) {
        (AbiValue::Bool(b), DynSolType::Bool) => Ok(DynSolValue::Bool(*b)),

        (AbiValue::Uint(u), DynSolType::Uint(bits)) => {
            Ok(DynSolValue::Uint(U256::from(*u), *bits))
        }
        (AbiValue::BigUint(s), DynSolType::Uint(bits)) => {
            let u = U256::from_str(s).map_err(|_| mismatch())?;
            Ok(DynSolValue::Uint(u, *bits))
        }

        (AbiValue::Int(i), DynSolType::Int(bits)) => {
            let v = I256::try_from(*i).map_err(|_| mismatch())?;
            Ok(DynSolValue::Int(v, *bits))
        }
        (AbiValue::BigInt(s), DynSolType::Int(bits)) => {
            let v = I256::from_str(s).map_err(|_| mismatch())?;
            Ok(DynSolValue::Int(v, *bits))
        }

        (AbiValue::Address(s), DynSolType::Address) => {
            let addr = Address::from_str(s).map_err(|_| mismatch())?;
            Ok(DynSolValue::Address(addr))
        }

        (AbiValue::Bytes(b), DynSolType::Bytes) => Ok(DynSolValue::Bytes(b.clone())),

        (AbiValue::Bytes(b), DynSolType::FixedBytes(n)) => {
            if b.len() != *n || *n > 32 {
                return Err(mismatch());
            }
            let mut arr = [0u8; 32];
            arr[..*n].copy_from_slice(b);
            Ok(DynSolValue::FixedBytes(FixedBytes::from(arr), *n))
        }

        (AbiValue::Str(s), DynSolType::String) => Ok(DynSolValue::String(s.clone())),

        (AbiValue::Array(elems), DynSolType::Array(inner)) => {
            let dyn_elems: Result<Vec<_>, _> =
                elems.iter().map(|e| to_dyn(e, inner)).collect();
            Ok(DynSolValue::Array(dyn_elems?))
        }

        (AbiValue::Array(elems), DynSolType::FixedArray(inner, len)) => {
            if elems.len() != *len {
                return Err(mismatch());
            }
            let dyn_elems: Result<Vec<_>, _> =
                elems.iter().map(|e| to_dyn(e, inner)).collect();
            Ok(DynSolValue::FixedArray(dyn_elems?))
        }

        (AbiValue::Tuple(fields), DynSolType::Tuple(types)) => {
            if fields.len() != types.len() {
                return Err(mismatch());
            }
            let dyn_elems: Result<Vec<_>, _> = fields
                .iter()
                .zip(types.iter())
                .map(|((_, v), t)| to_dyn(v, t))
                .collect();
            Ok(DynSolValue::Tuple(dyn_elems?))
        }

        _ => Err(mismatch()),
    }
}

/// Coerce a decoded uint value back to a `U256`, whichever representation
/// the normalizer picked.
pub fn as_u256(val: &AbiValue) -> Option<U256> {
    match val {
        AbiValue::Uint(v) => Some(U256::from(*v)),
        AbiValue::BigUint(s) => U256::from_str(s).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_small_uint() {
        let v = from_dyn(DynSolValue::Uint(U256::from(42u64), 256));
        assert_eq!(v, AbiValue::Uint(42));
    }

    #[test]
    fn normalize_large_uint_as_string() {
        let big = U256::MAX;
        let v = from_dyn(DynSolValue::Uint(big, 256));
        assert_eq!(v, AbiValue::BigUint(big.to_string()));
    }

    #[test]
    fn normalize_address_checksummed() {
        let addr: Address = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045".parse().unwrap();
        let v = from_dyn(DynSolValue::Address(addr));
        assert_eq!(
            v,
            AbiValue::Address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".into())
        );
    }

    #[test]
    fn as_u256_roundtrip() {
        assert_eq!(as_u256(&AbiValue::Uint(7)), Some(U256::from(7u64)));
        let big = U256::MAX.to_string();
        assert_eq!(as_u256(&AbiValue::BigUint(big)), Some(U256::MAX));
        assert_eq!(as_u256(&AbiValue::Bool(true)), None);
    }

    #[test]
    fn to_dyn_rejects_mismatch() {
        let res = to_dyn(&AbiValue::Bool(true), &DynSolType::Uint(256));
        assert!(res.is_err());
    }
}
