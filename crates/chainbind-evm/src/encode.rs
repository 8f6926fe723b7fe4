//! Calldata encoding for contract function calls.

use alloy_core::dyn_abi::DynSolValue;
use chainbind_core::{AbiFunction, AbiValue, DecodeError};

use crate::normalize;
use crate::topics;

/// Encode a function call to calldata bytes.
///
/// Returns `selector ++ abi_encode(tuple(args...))` — the standard EVM
/// calldata layout. Arguments must match the function's inputs in count
/// and type.
pub fn encode_call(function: &AbiFunction, args: &[AbiValue]) -> Result<Vec<u8>, DecodeError> {
    if args.len() != function.inputs.len() {
        return Err(DecodeError::AbiEncodeFailed {
            reason: format!(
                "'{}' takes {} arguments, got {}",
                function.name,
                function.inputs.len(),
                args.len()
            ),
        });
    }

    let mut dyn_values = Vec::with_capacity(args.len());
    for ((name, ty), arg) in function.inputs.iter().zip(args.iter()) {
        let sol_type = normalize::type_to_dyn(ty)?;
        let dyn_val = normalize::to_dyn(arg, &sol_type).map_err(|e| {
            DecodeError::AbiEncodeFailed {
                reason: format!("argument '{name}': {e}"),
            }
        })?;
        dyn_values.push(dyn_val);
    }

    let selector = topics::selector(&function.signature());
    let encoded = DynSolValue::Tuple(dyn_values).abi_encode();

    let mut calldata = selector.to_vec();
    calldata.extend_from_slice(&encoded);
    Ok(calldata)
}
