//! # chainbind-contract
//!
//! The generic layer every generated binding sits on: a `BoundContract`
//! couples a deployed address and its interface description with a call
//! provider (for `eth_call`/transaction submission) and a log source (for
//! event filters and watches). Generated code adds the typed wrappers;
//! everything below the types is shared here.

pub mod bound;
pub mod opts;
pub mod provider;

pub use bound::BoundContract;
pub use opts::{CallOpts, FilterOpts, TransactOpts, WatchOpts};
pub use provider::{CallProvider, PendingTransaction, TransactionRequest};
