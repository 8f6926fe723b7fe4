//! The `CallProvider` trait — the transport half of the call/transact path.

use async_trait::async_trait;
use chainbind_core::CallError;
use serde::{Deserialize, Serialize};

use crate::opts::{CallOpts, TransactOpts};

/// A contract invocation ready for dispatch: target address plus encoded
/// calldata. Built by `BoundContract`, consumed by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Target contract (0x-prefixed hex)
    pub to: String,
    /// `selector ++ abi-encoded arguments`
    #[serde(with = "hex_data")]
    pub data: Vec<u8>,
}

/// A submitted, not yet necessarily mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    /// Transaction hash assigned by the node (0x-prefixed hex)
    pub tx_hash: String,
}

/// Dispatches encoded contract invocations.
///
/// Reverts must surface as `CallError::Reverted` carrying the raw revert
/// data (`RevertReason::Raw`); `BoundContract` upgrades them to typed
/// reasons using the contract's interface description. Submission does no
/// client-side signing — `from` selects a node-managed account.
#[async_trait]
pub trait CallProvider: Send + Sync {
    /// Execute a constant call and return the raw return data.
    async fn call(
        &self,
        request: &TransactionRequest,
        opts: &CallOpts,
    ) -> Result<Vec<u8>, CallError>;

    /// Submit a state-mutating transaction.
    async fn send_transaction(
        &self,
        request: &TransactionRequest,
        opts: &TransactOpts,
    ) -> Result<PendingTransaction, CallError>;
}

mod hex_data {
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
