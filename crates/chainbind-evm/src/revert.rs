//! Revert-data decoding.
//!
//! Revert data is ABI-encoded as `selector(4 bytes) ++ arguments`:
//! - `Error(string)` — selector 0x08c379a0, `revert("...")` / `require`
//! - `Panic(uint256)` — selector 0x4e487b71, compiler-inserted checks
//! - anything else — a custom error matched against the contract interface

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use chainbind_core::{AbiError, RevertReason};

use crate::normalize;
use crate::topics;

const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];
const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Decode revert data into a `RevertReason`, trying the standard
/// `Error(string)` and `Panic(uint256)` shapes first, then the given
/// custom-error descriptions. Data that matches nothing is returned raw.
pub fn decode_revert(errors: &[AbiError], data: &[u8]) -> RevertReason {
    if data.len() < 4 {
        return RevertReason::Raw(data.to_vec());
    }
    let selector = [data[0], data[1], data[2], data[3]];
    let payload = &data[4..];

    if selector == ERROR_STRING_SELECTOR {
        if let Some(msg) = decode_single(payload, DynSolType::String)
            .and_then(|v| match v {
                DynSolValue::String(s) => Some(s),
                _ => None,
            })
        {
            return RevertReason::Message(msg);
        }
    } else if selector == PANIC_SELECTOR {
        if let Some(code) = decode_single(payload, DynSolType::Uint(256))
            .and_then(|v| match v {
                DynSolValue::Uint(u, _) => u64::try_from(u).ok(),
                _ => None,
            })
        {
            return RevertReason::Panic(code);
        }
    } else {
        for err in errors {
            if topics::selector(&err.signature()) != selector {
                continue;
            }
            if let Some(reason) = decode_custom(err, payload) {
                return reason;
            }
        }
    }

    RevertReason::Raw(data.to_vec())
}

/// Decode a payload as a single-element tuple of the given type.
fn decode_single(payload: &[u8], ty: DynSolType) -> Option<DynSolValue> {
    let decoded = DynSolType::Tuple(vec![ty]).abi_decode(payload).ok()?;
    match decoded {
        DynSolValue::Tuple(mut vals) if vals.len() == 1 => vals.pop(),
        _ => None,
    }
}

fn decode_custom(err: &AbiError, payload: &[u8]) -> Option<RevertReason> {
    if err.inputs.is_empty() {
        return Some(RevertReason::Custom {
            name: err.name.clone(),
            fields: vec![],
        });
    }

    let types: Vec<DynSolType> = err
        .inputs
        .iter()
        .map(|(_, t)| normalize::type_to_dyn(t).ok())
        .collect::<Option<Vec<_>>>()?;
    let decoded = DynSolType::Tuple(types).abi_decode(payload).ok()?;
    let values = match decoded {
        DynSolValue::Tuple(vals) => vals,
        single => vec![single],
    };

    let fields = err
        .inputs
        .iter()
        .zip(values.into_iter())
        .map(|((name, _), v)| (name.clone(), normalize::from_dyn(v)))
        .collect();

    Some(RevertReason::Custom {
        name: err.name.clone(),
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainbind_core::{AbiType, AbiValue};

    #[test]
    fn decode_error_string() {
        // revert("Not enough tokens to transfer")
        let data = hex::decode(
            "08c379a0\
             0000000000000000000000000000000000000000000000000000000000000020\
             000000000000000000000000000000000000000000000000000000000000001d\
             4e6f7420656e6f75676820746f6b656e7320746f207472616e73666572000000",
        )
        .unwrap();
        let reason = decode_revert(&[], &data);
        assert_eq!(
            reason,
            RevertReason::Message("Not enough tokens to transfer".into())
        );
    }

    #[test]
    fn decode_panic_overflow() {
        let mut data = PANIC_SELECTOR.to_vec();
        let mut word = vec![0u8; 32];
        word[31] = 0x11;
        data.extend(word);
        assert_eq!(decode_revert(&[], &data), RevertReason::Panic(0x11));
    }

    #[test]
    fn decode_zero_arg_custom_error() {
        let errors = vec![AbiError::new("ContractPaused", vec![])];
        let data = topics::selector("ContractPaused()").to_vec();
        let reason = decode_revert(&errors, &data);
        assert_eq!(
            reason,
            RevertReason::Custom {
                name: "ContractPaused".into(),
                fields: vec![],
            }
        );
    }

    #[test]
    fn decode_custom_error_with_field() {
        let errors = vec![AbiError::new(
            "InvalidPrice",
            vec![("price".into(), AbiType::Uint(256))],
        )];
        let mut data = topics::selector("InvalidPrice(uint256)").to_vec();
        let mut word = vec![0u8; 32];
        word[31] = 9;
        data.extend(word);

        match decode_revert(&errors, &data) {
            RevertReason::Custom { name, fields } => {
                assert_eq!(name, "InvalidPrice");
                assert_eq!(fields, vec![("price".into(), AbiValue::Uint(9))]);
            }
            other => panic!("unexpected reason: {other:?}"),
        }
    }

    #[test]
    fn unknown_selector_returned_raw() {
        let data = [0xde, 0xad, 0xbe, 0xef];
        assert_eq!(decode_revert(&[], &data), RevertReason::Raw(data.to_vec()));
    }
}
