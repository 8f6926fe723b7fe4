//! The `ContractEvent` trait — implemented by every generated event type.

use crate::error::DecodeError;
use crate::log::RawLog;

/// A typed contract event, decodable from a single raw log.
///
/// Generated bindings implement this once per event declared in the
/// contract interface. The stream adapter in `chainbind-stream` is generic
/// over it: any `ContractEvent` can be filtered, iterated and watched.
///
/// `decode` must be pure: the same raw log always yields the same event,
/// and decoding has no side effects.
pub trait ContractEvent: Sized + Send + 'static {
    /// Event name as declared in the contract, e.g. `GGPPriceUpdated`.
    const NAME: &'static str;

    /// Canonical ABI signature, e.g. `GGPPriceUpdated(uint256,uint256)`.
    const SIGNATURE: &'static str;

    /// 0x-prefixed keccak256 of `SIGNATURE` — topics[0] for logs of this
    /// event. Embedded as a constant by the binding generator.
    const SIGNATURE_TOPIC: &'static str;

    /// Decode a single raw log into the typed event.
    ///
    /// Fails if the log's topic/data shape does not match the event.
    fn decode(raw: &RawLog) -> Result<Self, DecodeError>;

    /// The raw log this event was decoded from.
    fn raw(&self) -> &RawLog;
}
