//! # chainbind-stream
//!
//! The log event stream adapter: turns a raw, asynchronous, possibly
//! failing feed of EVM logs into either a pull-based typed iterator or a
//! push-based watch that forwards decoded events to a sink until cancelled.
//!
//! ## Architecture
//! ```text
//! LogSource::open_log_feed(query)
//!       │
//!       ▼
//! LogFeed ── mpsc<RawLog> ───────┐    (data channel)
//!        └─ oneshot<Result<()>> ─┤    (completion channel, raced fairly)
//!                                ▼
//!        EventIterator<E>::advance()      pull: historical + live
//!        watch::<E>(source, query, sink)  push: background task + cancel
//! ```
//!
//! Both consumers own the feed exclusively and release it exactly once.
//! Failure is sticky: after a decode or feed error no further events are
//! observed, and the error stays retrievable.

pub mod iter;
pub mod query;
pub mod source;
pub mod static_source;
pub mod watch;
pub mod ws;

pub use iter::EventIterator;
pub use query::LogQuery;
pub use source::{FeedHandle, LogFeed, LogSource};
pub use static_source::StaticLogSource;
pub use watch::{watch, WatchHandle};
pub use ws::WsLogSource;
