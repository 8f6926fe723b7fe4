//! # chainbind-evm
//!
//! The EVM ABI codec backing ChainBind's generated bindings: event
//! signature topics and call selectors, event-log decoding, calldata
//! encoding, return-data decoding and revert-data decoding. Built on
//! alloy-rs dynamic ABI types; all decoded values are normalized into the
//! `AbiValue` model from `chainbind-core`.

pub mod decode;
pub mod encode;
pub mod normalize;
pub mod revert;
pub mod topics;

pub use decode::{decode_event_log, decode_return};
pub use encode::encode_call;
pub use revert::decode_revert;
pub use topics::{event_topic, selector, topic_u256};
