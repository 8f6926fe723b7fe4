//! HTTP JSON-RPC `CallProvider` implementation.
//!
//! Reverts come back inside the JSON-RPC error object's `data` field as
//! 0x-prefixed hex; they are surfaced as `CallError::Reverted` carrying the
//! raw bytes so the binding layer can decode them against the contract's
//! error descriptions. Transactions go through `eth_sendTransaction` —
//! signing is the node's job.

use async_trait::async_trait;
use chainbind_contract::{
    CallOpts, CallProvider, PendingTransaction, TransactOpts, TransactionRequest,
};
use chainbind_core::{CallError, RevertReason};
use serde_json::{json, Value};
use tracing::debug;

pub struct HttpProvider {
    url: String,
    client: reqwest::Client,
}

impl HttpProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, CallError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        debug!(method, "json-rpc request");

        let response: Value = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CallError::Transport {
                reason: e.to_string(),
            })?
            .json()
            .await
            .map_err(|e| CallError::Transport {
                reason: format!("bad json-rpc response: {e}"),
            })?;

        if let Some(err) = response.get("error") {
            // Revert data rides along in `error.data`
            if let Some(data_hex) = err.get("data").and_then(Value::as_str) {
                let stripped = data_hex.strip_prefix("0x").unwrap_or(data_hex);
                if let Ok(data) = hex::decode(stripped) {
                    if !data.is_empty() {
                        return Err(CallError::Reverted(RevertReason::Raw(data)));
                    }
                }
            }
            return Err(CallError::Rpc {
                code: err.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: err
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }

        Ok(response.get("result").cloned().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl CallProvider for HttpProvider {
    async fn call(
        &self,
        request: &TransactionRequest,
        opts: &CallOpts,
    ) -> Result<Vec<u8>, CallError> {
        let mut call = serde_json::Map::new();
        call.insert("to".into(), json!(request.to));
        call.insert("data".into(), json!(format!("0x{}", hex::encode(&request.data))));
        if let Some(from) = &opts.from {
            call.insert("from".into(), json!(from));
        }
        let block = match opts.block {
            Some(n) => format!("0x{n:x}"),
            None => "latest".to_string(),
        };

        let result = self
            .request("eth_call", json!([Value::Object(call), block]))
            .await?;
        let hex_str = result.as_str().ok_or(CallError::Transport {
            reason: "eth_call result is not a string".into(),
        })?;
        hex::decode(hex_str.strip_prefix("0x").unwrap_or(hex_str)).map_err(|e| {
            CallError::Transport {
                reason: format!("bad return data hex: {e}"),
            }
        })
    }

    async fn send_transaction(
        &self,
        request: &TransactionRequest,
        opts: &TransactOpts,
    ) -> Result<PendingTransaction, CallError> {
        let mut tx = serde_json::Map::new();
        tx.insert("from".into(), json!(opts.from));
        tx.insert("to".into(), json!(request.to));
        tx.insert("data".into(), json!(format!("0x{}", hex::encode(&request.data))));
        if let Some(gas) = opts.gas_limit {
            tx.insert("gas".into(), json!(format!("0x{gas:x}")));
        }
        if let Some(price) = opts.gas_price {
            tx.insert("gasPrice".into(), json!(format!("0x{price:x}")));
        }
        if let Some(value) = opts.value {
            tx.insert("value".into(), json!(format!("0x{value:x}")));
        }
        if let Some(nonce) = opts.nonce {
            tx.insert("nonce".into(), json!(format!("0x{nonce:x}")));
        }

        let result = self
            .request("eth_sendTransaction", json!([Value::Object(tx)]))
            .await?;
        let tx_hash = result.as_str().ok_or(CallError::Transport {
            reason: "eth_sendTransaction result is not a string".into(),
        })?;
        Ok(PendingTransaction {
            tx_hash: tx_hash.to_string(),
        })
    }
}
