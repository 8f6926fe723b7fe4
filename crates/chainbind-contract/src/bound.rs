//! `BoundContract` — one deployed contract, bound to a provider and a log
//! source.

use std::sync::Arc;

use chainbind_core::{
    AbiValue, CallError, ContractAbi, ContractEvent, DecodeError, RawLog, RevertReason,
    SourceError,
};
use chainbind_evm::{decode, encode, revert};
use chainbind_stream::{watch as stream_watch, EventIterator, LogQuery, LogSource, WatchHandle};
use tokio::sync::mpsc;
use tracing::debug;

use crate::opts::{CallOpts, FilterOpts, TransactOpts, WatchOpts};
use crate::provider::{CallProvider, PendingTransaction, TransactionRequest};

/// A deployed contract instance: address + interface description, bound to
/// the transports it needs. Either half may be absent — a log-only binding
/// needs no call provider, a call-only binding no log source.
#[derive(Clone)]
pub struct BoundContract {
    address: String,
    abi: Arc<ContractAbi>,
    provider: Option<Arc<dyn CallProvider>>,
    source: Option<Arc<dyn LogSource>>,
}

impl BoundContract {
    pub fn new(address: impl Into<String>, abi: ContractAbi) -> Self {
        Self {
            address: address.into(),
            abi: Arc::new(abi),
            provider: None,
            source: None,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn CallProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_log_source(mut self, source: Arc<dyn LogSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// The deployed address this instance is bound to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The interface description the binding was generated against.
    pub fn abi(&self) -> &ContractAbi {
        &self.abi
    }

    /// Invoke a constant method: encode arguments, dispatch via the
    /// provider, decode the outputs in declaration order. Reverts are
    /// decoded against the contract's error descriptions.
    pub async fn call(
        &self,
        opts: &CallOpts,
        method: &str,
        args: &[AbiValue],
    ) -> Result<Vec<AbiValue>, CallError> {
        let provider = self.provider.as_ref().ok_or(CallError::NoProvider)?;
        let function = self
            .abi
            .function(method)
            .ok_or_else(|| CallError::MissingFunction {
                name: method.to_string(),
            })?;

        let request = TransactionRequest {
            to: self.address.clone(),
            data: encode::encode_call(function, args)?,
        };
        debug!(method, to = %self.address, "contract call");

        let output = match provider.call(&request, opts).await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.upgrade_revert(e)),
        };
        Ok(decode::decode_return(function, &output)?)
    }

    /// Invoke a state-mutating method and return the pending transaction.
    pub async fn transact(
        &self,
        opts: &TransactOpts,
        method: &str,
        args: &[AbiValue],
    ) -> Result<PendingTransaction, CallError> {
        let provider = self.provider.as_ref().ok_or(CallError::NoProvider)?;
        let function = self
            .abi
            .function(method)
            .ok_or_else(|| CallError::MissingFunction {
                name: method.to_string(),
            })?;

        let request = TransactionRequest {
            to: self.address.clone(),
            data: encode::encode_call(function, args)?,
        };
        debug!(method, to = %self.address, from = %opts.from, "contract transact");

        provider
            .send_transaction(&request, opts)
            .await
            .map_err(|e| self.upgrade_revert(e))
    }

    /// Open a historical+live iterator over this contract's logs of event
    /// `E`, optionally constrained per indexed position.
    pub async fn filter_events<E: ContractEvent>(
        &self,
        opts: &FilterOpts,
        topic_filters: Vec<Vec<String>>,
    ) -> Result<EventIterator<E>, SourceError> {
        let source = self.log_source()?;
        let query = self.event_query::<E>(opts.from_block, opts.to_block, topic_filters);
        EventIterator::open(source.as_ref(), query).await
    }

    /// Watch this contract's logs of event `E`, forwarding each decoded
    /// event into `sink` until cancelled.
    pub async fn watch_events<E: ContractEvent>(
        &self,
        opts: &WatchOpts,
        sink: mpsc::Sender<E>,
        topic_filters: Vec<Vec<String>>,
    ) -> Result<WatchHandle, SourceError> {
        let source = self.log_source()?;
        let query = self.event_query::<E>(opts.from_block.unwrap_or(0), None, topic_filters);
        stream_watch::watch(source.as_ref(), query, sink).await
    }

    /// Decode a single already-obtained log into event `E`. Pure; needs no
    /// open subscription.
    pub fn parse_log<E: ContractEvent>(&self, raw: &RawLog) -> Result<E, DecodeError> {
        E::decode(raw)
    }

    fn log_source(&self) -> Result<&Arc<dyn LogSource>, SourceError> {
        self.source.as_ref().ok_or(SourceError::Unavailable {
            reason: "no log source configured".into(),
        })
    }

    fn event_query<E: ContractEvent>(
        &self,
        from_block: u64,
        to_block: Option<u64>,
        topic_filters: Vec<Vec<String>>,
    ) -> LogQuery {
        let mut query = LogQuery::event(self.address.clone(), E::SIGNATURE_TOPIC)
            .with_blocks(from_block, to_block);
        query.topic_filters = topic_filters;
        query
    }

    /// Re-decode a raw revert against the contract's error descriptions.
    fn upgrade_revert(&self, err: CallError) -> CallError {
        match err {
            CallError::Reverted(RevertReason::Raw(data)) => {
                CallError::Reverted(revert::decode_revert(&self.abi.errors, &data))
            }
            other => other,
        }
    }
}
