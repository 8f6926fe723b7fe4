//! An in-memory log source that replays a fixed set of records.
//!
//! Used by tests, examples and offline tooling: the feed serves every
//! stored record matching the query in insertion order, then completes —
//! cleanly by default, or with an injected terminal error.

use async_trait::async_trait;
use chainbind_core::{RawLog, SourceError, StreamError};

use crate::query::LogQuery;
use crate::source::{LogFeed, LogSource};

/// Replays stored records through a feed.
#[derive(Debug, Clone, Default)]
pub struct StaticLogSource {
    records: Vec<RawLog>,
    /// When set, the feed terminates with this subscription error instead
    /// of completing cleanly.
    terminal_error: Option<String>,
    capacity: Option<usize>,
}

impl StaticLogSource {
    pub fn new(records: Vec<RawLog>) -> Self {
        Self {
            records,
            terminal_error: None,
            capacity: None,
        }
    }

    /// Terminate every feed with a subscription error after the backlog.
    pub fn with_terminal_error(mut self, reason: impl Into<String>) -> Self {
        self.terminal_error = Some(reason.into());
        self
    }

    /// Override the feed's data-channel capacity (default: enough to hold
    /// the whole backlog).
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

#[async_trait]
impl LogSource for StaticLogSource {
    async fn open_log_feed(&self, query: &LogQuery) -> Result<LogFeed, SourceError> {
        let matching: Vec<RawLog> = self
            .records
            .iter()
            .filter(|log| query.matches(log))
            .cloned()
            .collect();

        let capacity = self.capacity.unwrap_or_else(|| matching.len().max(1));
        let (handle, feed) = LogFeed::channel(capacity);
        let terminal_error = self.terminal_error.clone();

        tokio::spawn(async move {
            for log in matching {
                if !handle.send(log).await {
                    return; // consumer released the feed
                }
            }
            match terminal_error {
                Some(reason) => handle.finish(Err(StreamError::Subscription { reason })),
                None => handle.finish(Ok(())),
            }
        });

        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(block: u64) -> RawLog {
        RawLog {
            address: "0xaaaa".into(),
            topics: vec!["0x01".into()],
            data: vec![],
            block_number: block,
            block_hash: "0x01".into(),
            tx_hash: "0xabc".into(),
            tx_index: 0,
            log_index: 0,
            removed: false,
        }
    }

    #[tokio::test]
    async fn replays_only_matching_records() {
        let source = StaticLogSource::new(vec![log(1), log(5), log(9)]);
        let query = LogQuery::default().with_blocks(2, Some(8));
        let mut feed = source.open_log_feed(&query).await.unwrap();

        let first = feed.logs.recv().await.unwrap();
        assert_eq!(first.block_number, 5);
        assert!(feed.logs.recv().await.is_none());
        assert!(feed.completion.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn terminal_error_reaches_completion() {
        let source = StaticLogSource::new(vec![]).with_terminal_error("backend gone");
        let mut feed = source.open_log_feed(&LogQuery::default()).await.unwrap();
        assert!(feed.logs.recv().await.is_none());
        let outcome = feed.completion.await.unwrap();
        assert!(matches!(outcome, Err(StreamError::Subscription { .. })));
    }
}
