//! The Oracle contract's event types.

use std::sync::OnceLock;

use alloy_primitives::U256;
use chainbind_core::{AbiEvent, AbiParam, AbiType, ContractEvent, DecodeError, RawLog};
use chainbind_evm::decode::decode_event_log;
use chainbind_evm::normalize::as_u256;

/// `GGPPriceUpdated(uint256 indexed price, uint256 timestamp)` — emitted
/// whenever the oracle's GGP price is updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GgpPriceUpdated {
    /// New GGP price in AVAX (18 decimals)
    pub price: U256,
    /// Unix timestamp the price was set at
    pub timestamp: U256,
    /// The log this event was decoded from
    pub raw: RawLog,
}

pub(crate) fn ggp_price_updated_abi() -> &'static AbiEvent {
    static ABI: OnceLock<AbiEvent> = OnceLock::new();
    ABI.get_or_init(|| {
        AbiEvent::new(
            "GGPPriceUpdated",
            vec![
                AbiParam::indexed("price", AbiType::Uint(256)),
                AbiParam::new("timestamp", AbiType::Uint(256)),
            ],
        )
    })
}

impl ContractEvent for GgpPriceUpdated {
    const NAME: &'static str = "GGPPriceUpdated";
    const SIGNATURE: &'static str = "GGPPriceUpdated(uint256,uint256)";
    const SIGNATURE_TOPIC: &'static str =
        "0x1826f74860bd5ff97bcab2245acae00a635acaa3dbc72e5c68b83ff34b1fac00";

    fn decode(raw: &RawLog) -> Result<Self, DecodeError> {
        let fields = decode_event_log(ggp_price_updated_abi(), raw)?;
        let field = |name: &str| {
            fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v)
                .ok_or_else(|| DecodeError::MissingField { field: name.into() })
        };

        let price = as_u256(field("price")?).ok_or(DecodeError::TypeMismatch {
            expected: "uint256".into(),
            got: "non-numeric price".into(),
        })?;
        let timestamp = as_u256(field("timestamp")?).ok_or(DecodeError::TypeMismatch {
            expected: "uint256".into(),
            got: "non-numeric timestamp".into(),
        })?;

        Ok(Self {
            price,
            timestamp,
            raw: raw.clone(),
        })
    }

    fn raw(&self) -> &RawLog {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainbind_evm::topics::event_topic;

    #[test]
    fn signature_topic_matches_keccak() {
        assert_eq!(
            event_topic(GgpPriceUpdated::SIGNATURE),
            GgpPriceUpdated::SIGNATURE_TOPIC
        );
    }
}
