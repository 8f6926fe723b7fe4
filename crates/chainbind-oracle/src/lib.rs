//! # chainbind-oracle
//!
//! Typed binding for the GoGoPool Oracle contract: price reads, guarded
//! price updates and the `GGPPriceUpdated` event with filter/watch/parse
//! access. One instantiation of the `chainbind-contract` binding pattern —
//! every method here is a thin typed wrapper over `BoundContract`.

pub mod errors;
pub mod events;

use std::sync::Arc;

use alloy_primitives::U256;
use chainbind_contract::{
    BoundContract, CallOpts, CallProvider, FilterOpts, PendingTransaction, TransactOpts,
    WatchOpts,
};
use chainbind_core::{
    AbiError, AbiEvent, AbiFunction, AbiParam, AbiType, AbiValue, CallError, ContractAbi,
    DecodeError, RawLog, SourceError,
};
use chainbind_evm::normalize::as_u256;
use chainbind_evm::topics::topic_u256;
use chainbind_stream::{EventIterator, LogSource, WatchHandle};
use tokio::sync::mpsc;

pub use errors::OracleContractError;
pub use events::GgpPriceUpdated;

// Re-exported so a binding consumer needs only this crate.
pub use chainbind_contract::opts;

/// A GGP price observation: the price in AVAX and when it was set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub price: U256,
    pub timestamp: U256,
}

/// The Oracle contract's interface description.
pub fn oracle_abi() -> ContractAbi {
    let uint256 = || AbiType::Uint(256);
    ContractAbi::new(
        vec![
            AbiFunction::view(
                "getContractAddress",
                vec![("contractName".into(), AbiType::Str)],
                vec![("".into(), AbiType::Address)],
            ),
            AbiFunction::view(
                "getGGPPriceInAVAX",
                vec![],
                vec![("price".into(), uint256()), ("timestamp".into(), uint256())],
            ),
            AbiFunction::view(
                "getGGPPriceInAVAXFromOneInch",
                vec![],
                vec![("price".into(), uint256()), ("timestamp".into(), uint256())],
            ),
            AbiFunction::mutating(
                "setGGPPriceInAVAX",
                vec![("price".into(), uint256()), ("timestamp".into(), uint256())],
            ),
            AbiFunction::mutating("setOneInch", vec![("addr".into(), AbiType::Address)]),
            AbiFunction::view("version", vec![], vec![("".into(), AbiType::Uint(8))]),
        ],
        vec![AbiEvent::new(
            "GGPPriceUpdated",
            vec![
                AbiParam::indexed("price", uint256()),
                AbiParam::new("timestamp", uint256()),
            ],
        )],
        vec![
            AbiError::new("ContractNotFound", vec![]),
            AbiError::new("ContractPaused", vec![]),
            AbiError::new("InvalidGGPPrice", vec![]),
            AbiError::new("InvalidOrOutdatedContract", vec![]),
            AbiError::new("InvalidTimestamp", vec![]),
            AbiError::new("MustBeGuardian", vec![]),
            AbiError::new("MustBeGuardianOrValidContract", vec![]),
            AbiError::new("MustBeMultisig", vec![]),
        ],
    )
}

/// Typed handle to a deployed Oracle contract.
#[derive(Clone)]
pub struct Oracle {
    contract: BoundContract,
}

impl Oracle {
    /// Bind to a deployed Oracle with both a call provider and a log
    /// source.
    pub fn new(
        address: impl Into<String>,
        provider: Arc<dyn CallProvider>,
        source: Arc<dyn LogSource>,
    ) -> Self {
        Self {
            contract: BoundContract::new(address, oracle_abi())
                .with_provider(provider)
                .with_log_source(source),
        }
    }

    /// Bind for event access only; contract calls will fail.
    pub fn read_only(address: impl Into<String>, source: Arc<dyn LogSource>) -> Self {
        Self {
            contract: BoundContract::new(address, oracle_abi()).with_log_source(source),
        }
    }

    /// Bind for contract calls only; event access will fail.
    pub fn caller(address: impl Into<String>, provider: Arc<dyn CallProvider>) -> Self {
        Self {
            contract: BoundContract::new(address, oracle_abi()).with_provider(provider),
        }
    }

    /// The generic binding underneath, for raw access.
    pub fn contract(&self) -> &BoundContract {
        &self.contract
    }

    // ─── Constant calls ──────────────────────────────────────────────────

    /// `getContractAddress(string contractName) view returns (address)`
    pub async fn get_contract_address(
        &self,
        opts: &CallOpts,
        contract_name: &str,
    ) -> Result<String, CallError> {
        let out = self
            .contract
            .call(
                opts,
                "getContractAddress",
                &[AbiValue::Str(contract_name.to_string())],
            )
            .await?;
        expect_address(&out, 0, "getContractAddress")
    }

    /// `getGGPPriceInAVAX() view returns (uint256 price, uint256 timestamp)`
    pub async fn get_ggp_price_in_avax(&self, opts: &CallOpts) -> Result<PriceQuote, CallError> {
        let out = self.contract.call(opts, "getGGPPriceInAVAX", &[]).await?;
        price_quote(&out, "getGGPPriceInAVAX")
    }

    /// `getGGPPriceInAVAXFromOneInch() view returns (uint256 price, uint256 timestamp)`
    pub async fn get_ggp_price_in_avax_from_one_inch(
        &self,
        opts: &CallOpts,
    ) -> Result<PriceQuote, CallError> {
        let out = self
            .contract
            .call(opts, "getGGPPriceInAVAXFromOneInch", &[])
            .await?;
        price_quote(&out, "getGGPPriceInAVAXFromOneInch")
    }

    /// `version() view returns (uint8)`
    pub async fn version(&self, opts: &CallOpts) -> Result<u8, CallError> {
        let out = self.contract.call(opts, "version", &[]).await?;
        let value = out.first().ok_or(CallError::MissingOutput {
            function: "version".into(),
            index: 0,
        })?;
        let v = value.as_u128().ok_or(CallError::MissingOutput {
            function: "version".into(),
            index: 0,
        })?;
        u8::try_from(v).map_err(|_| {
            CallError::Abi(DecodeError::TypeMismatch {
                expected: "uint8".into(),
                got: v.to_string(),
            })
        })
    }

    // ─── Transactions ────────────────────────────────────────────────────

    /// `setGGPPriceInAVAX(uint256 price, uint256 timestamp)` — multisig
    /// only on-chain; reverts decode to [`OracleContractError`].
    pub async fn set_ggp_price_in_avax(
        &self,
        opts: &TransactOpts,
        price: U256,
        timestamp: U256,
    ) -> Result<PendingTransaction, CallError> {
        self.contract
            .transact(
                opts,
                "setGGPPriceInAVAX",
                &[uint_value(price), uint_value(timestamp)],
            )
            .await
    }

    /// `setOneInch(address addr)` — guardian only on-chain.
    pub async fn set_one_inch(
        &self,
        opts: &TransactOpts,
        addr: &str,
    ) -> Result<PendingTransaction, CallError> {
        self.contract
            .transact(opts, "setOneInch", &[AbiValue::Address(addr.to_string())])
            .await
    }

    // ─── Events ──────────────────────────────────────────────────────────

    /// Open a historical+live iterator over `GGPPriceUpdated` logs.
    /// `price_filter` constrains the indexed price to the given values;
    /// empty means any.
    pub async fn filter_price_updated(
        &self,
        opts: &FilterOpts,
        price_filter: Vec<U256>,
    ) -> Result<EventIterator<GgpPriceUpdated>, SourceError> {
        self.contract
            .filter_events(opts, price_topic_filter(price_filter))
            .await
    }

    /// Watch `GGPPriceUpdated` logs, forwarding each decoded event into
    /// `sink` until the returned handle is cancelled.
    pub async fn watch_price_updated(
        &self,
        opts: &WatchOpts,
        sink: mpsc::Sender<GgpPriceUpdated>,
        price_filter: Vec<U256>,
    ) -> Result<WatchHandle, SourceError> {
        self.contract
            .watch_events(opts, sink, price_topic_filter(price_filter))
            .await
    }

    /// Decode a single already-obtained log as `GGPPriceUpdated`.
    pub fn parse_price_updated(&self, raw: &RawLog) -> Result<GgpPriceUpdated, DecodeError> {
        self.contract.parse_log(raw)
    }
}

fn price_topic_filter(prices: Vec<U256>) -> Vec<Vec<String>> {
    if prices.is_empty() {
        return vec![];
    }
    vec![prices.into_iter().map(topic_u256).collect()]
}

fn uint_value(v: U256) -> AbiValue {
    match u128::try_from(v) {
        Ok(small) => AbiValue::Uint(small),
        Err(_) => AbiValue::BigUint(v.to_string()),
    }
}

fn price_quote(out: &[AbiValue], function: &str) -> Result<PriceQuote, CallError> {
    let uint_at = |index: usize| {
        out.get(index)
            .and_then(as_u256)
            .ok_or(CallError::MissingOutput {
                function: function.to_string(),
                index,
            })
    };
    Ok(PriceQuote {
        price: uint_at(0)?,
        timestamp: uint_at(1)?,
    })
}

fn expect_address(out: &[AbiValue], index: usize, function: &str) -> Result<String, CallError> {
    out.get(index)
        .and_then(|v| v.as_address())
        .map(str::to_string)
        .ok_or(CallError::MissingOutput {
            function: function.to_string(),
            index,
        })
}
