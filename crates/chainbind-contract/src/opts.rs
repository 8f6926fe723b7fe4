//! Per-call, per-transaction and per-filter options.

use serde::{Deserialize, Serialize};

/// Options for a constant (read-only) call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallOpts {
    /// Sender to impersonate for the call, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Block height to execute against; None = latest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<u64>,
}

impl CallOpts {
    /// Call at the latest block with no sender override.
    pub fn latest() -> Self {
        Self::default()
    }

    /// Call against a specific historical block.
    pub fn at_block(block: u64) -> Self {
        Self {
            from: None,
            block: Some(block),
        }
    }
}

/// Options for a state-mutating transaction.
///
/// No signing happens client-side: `from` selects a node-managed account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactOpts {
    /// Sending account (node-managed)
    pub from: String,
    /// Gas limit; None lets the node estimate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    /// Gas price in wei; None lets the node choose
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u128>,
    /// Wei to transfer alongside the call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u128>,
    /// Explicit nonce; None lets the node assign one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

impl TransactOpts {
    pub fn from_account(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            ..Self::default()
        }
    }
}

/// Block range for a historical event filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterOpts {
    /// First block to include
    pub from_block: u64,
    /// Last block to include; None = up to the head, then keep following
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<u64>,
}

impl FilterOpts {
    pub fn range(from_block: u64, to_block: Option<u64>) -> Self {
        Self {
            from_block,
            to_block,
        }
    }
}

/// Start point for a live event watch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchOpts {
    /// First block to include; None = from the next block onward
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block: Option<u64>,
}
