//! The `LogSource` trait and the feed primitives it hands out.
//!
//! A log source owns the transport (WebSocket, in-memory replay, ...). For
//! each opened query it returns a `LogFeed`: a bounded data channel of raw
//! logs plus a one-shot completion channel. The producer half, `FeedHandle`,
//! stays with the source's background task.

use async_trait::async_trait;
use chainbind_core::{RawLog, SourceError, StreamError};
use tokio::sync::{mpsc, oneshot};

use crate::query::LogQuery;

/// Default data-channel capacity for a feed.
pub const DEFAULT_FEED_CAPACITY: usize = 512;

/// The consumer half of an open log feed.
///
/// `logs` delivers raw records in source order. `completion` resolves
/// exactly once: `Ok(())` when the source finished cleanly (bounded query
/// exhausted, or orderly shutdown), `Err(_)` when it terminated abnormally.
/// A dropped completion sender counts as clean completion.
///
/// The feed is owned by exactly one consumer and released exactly once —
/// dropping it closes the data channel, which stops the producer task.
#[derive(Debug)]
pub struct LogFeed {
    pub logs: mpsc::Receiver<RawLog>,
    pub completion: oneshot::Receiver<Result<(), StreamError>>,
}

impl LogFeed {
    /// Create a feed and its producer half with the given data-channel
    /// capacity.
    pub fn channel(capacity: usize) -> (FeedHandle, LogFeed) {
        let (log_tx, log_rx) = mpsc::channel(capacity);
        let (done_tx, done_rx) = oneshot::channel();
        (
            FeedHandle {
                logs: log_tx,
                completion: done_tx,
            },
            LogFeed {
                logs: log_rx,
                completion: done_rx,
            },
        )
    }
}

/// The producer half of a log feed, held by the source's background task.
#[derive(Debug)]
pub struct FeedHandle {
    pub logs: mpsc::Sender<RawLog>,
    completion: oneshot::Sender<Result<(), StreamError>>,
}

impl FeedHandle {
    /// Deliver one record, waiting for channel capacity. Returns `false`
    /// if the consumer released the feed — the producer should stop.
    pub async fn send(&self, log: RawLog) -> bool {
        self.logs.send(log).await.is_ok()
    }

    /// Signal the terminal outcome of the feed. Consumes the handle; the
    /// data channel closes when the last sender is dropped.
    pub fn finish(self, outcome: Result<(), StreamError>) {
        // Consumer may already be gone; nothing to do then.
        let _ = self.completion.send(outcome);
    }
}

/// Abstracts over log transports.
///
/// `open_log_feed` establishes a combined historical+live feed scoped to
/// the query and returns its consumer half, or fails synchronously with a
/// `SourceError` if the feed cannot be established at all. Errors after a
/// successful open travel through the feed's completion channel instead.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn open_log_feed(&self, query: &LogQuery) -> Result<LogFeed, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_log() -> RawLog {
        RawLog {
            address: "0xaaaa".into(),
            topics: vec!["0x01".into()],
            data: vec![],
            block_number: 1,
            block_hash: "0x01".into(),
            tx_hash: "0xabc".into(),
            tx_index: 0,
            log_index: 0,
            removed: false,
        }
    }

    #[tokio::test]
    async fn feed_delivers_then_completes() {
        let (handle, mut feed) = LogFeed::channel(4);
        assert!(handle.send(sample_log()).await);
        handle.finish(Ok(()));

        assert!(feed.logs.recv().await.is_some());
        assert!(feed.completion.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn dropped_consumer_stops_producer() {
        let (handle, feed) = LogFeed::channel(1);
        drop(feed);
        assert!(!handle.send(sample_log()).await);
    }
}
