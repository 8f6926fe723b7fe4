//! Event-log and return-data decoding.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use chainbind_core::{AbiEvent, AbiFunction, AbiType, AbiValue, DecodeError, RawLog};

use crate::normalize;
use crate::topics;

/// Decode a raw log against an event description.
///
/// Verifies topics[0] against the event's signature topic, decodes
/// topics[1..] as the indexed parameters and the data payload as the
/// non-indexed tuple. Strict: any shape mismatch is an error.
///
/// Returns the decoded fields in declaration order.
pub fn decode_event_log(
    event: &AbiEvent,
    raw: &RawLog,
) -> Result<Vec<(String, AbiValue)>, DecodeError> {
    let expected_topic = topics::event_topic(&event.signature());
    match raw.event_topic() {
        Some(got) if got.eq_ignore_ascii_case(&expected_topic) => {}
        Some(got) => {
            return Err(DecodeError::SignatureMismatch {
                expected: expected_topic,
                got: got.to_string(),
            })
        }
        None => {
            return Err(DecodeError::InvalidRawLog {
                reason: "log has no topics".into(),
            })
        }
    }

    let mut indexed = Vec::new();
    for (i, param) in event.indexed_inputs().into_iter().enumerate() {
        let topic_idx = i + 1; // topics[0] is the signature
        let topic = raw.topics.get(topic_idx).ok_or(DecodeError::MissingTopic {
            param: param.name.clone(),
            index: topic_idx,
        })?;
        indexed.push((param.name.clone(), decode_topic(topic, &param.ty)?));
    }

    let data_params = event.data_inputs();
    let data = decode_data(&raw.data, &data_params)?;

    // Re-interleave into declaration order
    let mut indexed_iter = indexed.into_iter();
    let mut data_iter = data.into_iter();
    let fields = event
        .inputs
        .iter()
        .map(|p| {
            if p.indexed {
                indexed_iter.next()
            } else {
                data_iter.next()
            }
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| DecodeError::Other("field count mismatch".into()))?;

    Ok(fields)
}

/// Decode a single indexed topic (always 32 bytes, ABI-encoded).
///
/// # EVM ABI indexed-parameter encoding rules
/// - **Value types** (uint, int, bool, address, bytes1–bytes32): padded to
///   32 bytes, stored directly — decodable.
/// - **Reference types** (string, bytes, arrays, tuples): stored as the
///   keccak256 of their encoded form — the original value is unrecoverable,
///   so the raw 32-byte hash is returned as `Bytes`.
fn decode_topic(topic: &str, ty: &AbiType) -> Result<AbiValue, DecodeError> {
    let stripped = topic.strip_prefix("0x").unwrap_or(topic);
    let bytes = hex::decode(stripped).map_err(|e| DecodeError::InvalidRawLog {
        reason: format!("invalid topic hex: {e}"),
    })?;
    if bytes.len() != 32 {
        return Err(DecodeError::InvalidRawLog {
            reason: format!("topic is {} bytes, expected 32", bytes.len()),
        });
    }

    match ty {
        AbiType::Str | AbiType::Bytes | AbiType::Vec(_) | AbiType::Array { .. } | AbiType::Tuple(_) => {
            return Ok(AbiValue::Bytes(bytes));
        }
        _ => {}
    }

    let dyn_type = normalize::type_to_dyn(ty)?;
    let val = dyn_type
        .abi_decode(&bytes)
        .map_err(|e| DecodeError::AbiDecodeFailed {
            reason: format!("topic decode: {e}"),
        })?;
    Ok(normalize::from_dyn(val))
}

/// Decode the log data payload (non-indexed params) as an ABI-encoded tuple.
fn decode_data(
    raw_data: &[u8],
    params: &[&chainbind_core::AbiParam],
) -> Result<Vec<(String, AbiValue)>, DecodeError> {
    if params.is_empty() {
        return Ok(Vec::new());
    }

    let types: Result<Vec<DynSolType>, _> =
        params.iter().map(|p| normalize::type_to_dyn(&p.ty)).collect();
    let tuple_type = DynSolType::Tuple(types?);

    let decoded = tuple_type
        .abi_decode(raw_data)
        .map_err(|e| DecodeError::AbiDecodeFailed {
            reason: e.to_string(),
        })?;

    let values = match decoded {
        DynSolValue::Tuple(vals) => vals,
        other => vec![other],
    };
    if values.len() != params.len() {
        return Err(DecodeError::AbiDecodeFailed {
            reason: format!("expected {} data fields, got {}", params.len(), values.len()),
        });
    }

    Ok(params
        .iter()
        .zip(values.into_iter())
        .map(|(p, v)| (p.name.clone(), normalize::from_dyn(v)))
        .collect())
}

/// Decode a function's return data into output values in declaration order.
pub fn decode_return(
    function: &AbiFunction,
    data: &[u8],
) -> Result<Vec<AbiValue>, DecodeError> {
    if function.outputs.is_empty() {
        return Ok(Vec::new());
    }

    let types: Result<Vec<DynSolType>, _> = function
        .outputs
        .iter()
        .map(|(_, t)| normalize::type_to_dyn(t))
        .collect();
    let tuple_type = DynSolType::Tuple(types?);

    let decoded = tuple_type
        .abi_decode(data)
        .map_err(|e| DecodeError::AbiDecodeFailed {
            reason: format!("return data: {e}"),
        })?;

    let values = match decoded {
        DynSolValue::Tuple(vals) => vals,
        other => vec![other],
    };

    Ok(values.into_iter().map(normalize::from_dyn).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainbind_core::AbiParam;

    fn price_updated_event() -> AbiEvent {
        AbiEvent::new(
            "GGPPriceUpdated",
            vec![
                AbiParam::indexed("price", AbiType::Uint(256)),
                AbiParam::new("timestamp", AbiType::Uint(256)),
            ],
        )
    }

    fn uint_word(v: u64) -> Vec<u8> {
        let mut word = vec![0u8; 32];
        word[24..].copy_from_slice(&v.to_be_bytes());
        word
    }

    fn price_log(price: u64, timestamp: u64) -> RawLog {
        RawLog {
            address: "0x30fb915258d844e9dc420b2c3aa97420aea16db7".into(),
            topics: vec![
                "0x1826f74860bd5ff97bcab2245acae00a635acaa3dbc72e5c68b83ff34b1fac00".into(),
                format!("0x{}", hex::encode(uint_word(price))),
            ],
            data: uint_word(timestamp),
            block_number: 1,
            block_hash: "0x01".into(),
            tx_hash: "0xabc".into(),
            tx_index: 0,
            log_index: 0,
            removed: false,
        }
    }

    #[test]
    fn decode_price_updated() {
        let fields = decode_event_log(&price_updated_event(), &price_log(100, 1000)).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], ("price".into(), AbiValue::Uint(100)));
        assert_eq!(fields[1], ("timestamp".into(), AbiValue::Uint(1000)));
    }

    #[test]
    fn signature_mismatch_rejected() {
        let mut log = price_log(100, 1000);
        log.topics[0] =
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef".into();
        let err = decode_event_log(&price_updated_event(), &log).unwrap_err();
        assert!(matches!(err, DecodeError::SignatureMismatch { .. }));
    }

    #[test]
    fn missing_indexed_topic_rejected() {
        let mut log = price_log(100, 1000);
        log.topics.truncate(1);
        let err = decode_event_log(&price_updated_event(), &log).unwrap_err();
        assert!(matches!(err, DecodeError::MissingTopic { .. }));
    }

    #[test]
    fn truncated_data_rejected() {
        let mut log = price_log(100, 1000);
        log.data.truncate(16);
        assert!(decode_event_log(&price_updated_event(), &log).is_err());
    }

    #[test]
    fn decode_two_word_return() {
        let f = AbiFunction::view(
            "getGGPPriceInAVAX",
            vec![],
            vec![
                ("price".into(), AbiType::Uint(256)),
                ("timestamp".into(), AbiType::Uint(256)),
            ],
        );
        let mut data = uint_word(100);
        data.extend(uint_word(1000));
        let out = decode_return(&f, &data).unwrap();
        assert_eq!(out, vec![AbiValue::Uint(100), AbiValue::Uint(1000)]);
    }
}
