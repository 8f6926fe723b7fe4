//! Error types for the ChainBind decode, stream and call pipelines.

use crate::types::AbiValue;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while decoding a single log or ABI payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("ABI decode failed: {reason}")]
    AbiDecodeFailed { reason: String },

    #[error("ABI encode failed: {reason}")]
    AbiEncodeFailed { reason: String },

    #[error("Event signature mismatch: expected {expected}, got {got}")]
    SignatureMismatch { expected: String, got: String },

    #[error("Missing topic for indexed parameter '{param}' (topic {index})")]
    MissingTopic { param: String, index: usize },

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Missing field: {field}")]
    MissingField { field: String },

    #[error("Invalid raw log: {reason}")]
    InvalidRawLog { reason: String },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors establishing a log feed. Returned synchronously when opening a
/// filter or watch; never surfaced mid-stream.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Connection failed: {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Invalid log query: {reason}")]
    InvalidQuery { reason: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Log source unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Terminal errors of an open log stream. Once one is observed, iteration
/// never resumes — failure is sticky.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Decode error in stream: {0}")]
    Decode(#[from] DecodeError),

    #[error("Subscription failed: {reason}")]
    Subscription { reason: String },

    #[error("Stream closed unexpectedly")]
    Closed,
}

/// Why a contract call reverted.
#[derive(Debug, Clone, PartialEq)]
pub enum RevertReason {
    /// `revert("...")` / `require(..., "...")` — the standard `Error(string)`
    Message(String),
    /// `Panic(uint256)` — arithmetic overflow, bad array access, etc.
    Panic(u64),
    /// A custom error matched against the contract interface
    Custom {
        name: String,
        fields: Vec<(String, AbiValue)>,
    },
    /// Revert data that matched no known shape
    Raw(Vec<u8>),
}

impl fmt::Display for RevertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevertReason::Message(msg) => write!(f, "reverted: {msg}"),
            RevertReason::Panic(code) => write!(f, "panicked: code {code:#x}"),
            RevertReason::Custom { name, fields } => {
                let parts: Vec<_> = fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
                write!(f, "{name}({})", parts.join(", "))
            }
            RevertReason::Raw(data) => write!(f, "reverted: 0x{}", hex::encode(data)),
        }
    }
}

/// Errors from the call/transact path.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("ABI error: {0}")]
    Abi(#[from] DecodeError),

    #[error("Function '{name}' not found in contract interface")]
    MissingFunction { name: String },

    #[error("Function '{function}' returned no output at index {index}")]
    MissingOutput { function: String, index: usize },

    #[error("Call reverted: {0}")]
    Reverted(RevertReason),

    #[error("Transport error: {reason}")]
    Transport { reason: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("No call provider configured")]
    NoProvider,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revert_reason_display() {
        assert_eq!(
            RevertReason::Message("not enough".into()).to_string(),
            "reverted: not enough"
        );
        assert_eq!(RevertReason::Panic(0x11).to_string(), "panicked: code 0x11");
        assert_eq!(
            RevertReason::Custom {
                name: "ContractPaused".into(),
                fields: vec![],
            }
            .to_string(),
            "ContractPaused()"
        );
    }
}
