//! # chainbind-core
//!
//! Core types shared across all ChainBind crates: the raw log model, the
//! ABI type/value system, event and function descriptions, the
//! `ContractEvent` trait that generated bindings implement, and the error
//! types for every layer. This crate is IO-free; async plumbing lives in
//! `chainbind-stream` and the alloy-backed codec in `chainbind-evm`.

pub mod abi;
pub mod error;
pub mod event;
pub mod log;
pub mod types;

pub use abi::{AbiError, AbiEvent, AbiFunction, AbiParam, ContractAbi};
pub use error::{CallError, DecodeError, RevertReason, SourceError, StreamError};
pub use event::ContractEvent;
pub use log::RawLog;
pub use types::{AbiType, AbiValue};
