//! Pull-based iteration over a historical+live event feed.

use chainbind_core::{ContractEvent, SourceError, StreamError};
use tokio::sync::mpsc::error::TryRecvError;
use tracing::debug;

use crate::query::LogQuery;
use crate::source::{LogFeed, LogSource};

/// Iterator lifecycle.
///
/// ```text
/// Active ──▶ Draining ──▶ Exhausted
///    │
///    └─────▶ Failed
/// ```
///
/// `Active → Failed` on any decode or feed error. `Active → Draining` when
/// the source signals clean completion; draining serves records already
/// buffered in the channel without blocking, then the iterator is
/// `Exhausted`. No transition leaves `Failed` or `Exhausted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IterState {
    Active,
    Draining,
    Exhausted,
    Failed,
}

/// A typed, pull-based iterator over the logs matched by a query.
///
/// Owns its feed exclusively. Failure is sticky: once `advance` has
/// returned `false` because of an error, every later call returns `false`
/// and [`EventIterator::error`] keeps returning that same error.
#[derive(Debug)]
pub struct EventIterator<E: ContractEvent> {
    feed: LogFeed,
    /// Set to false once the completion channel has resolved (it must not
    /// be polled again afterwards).
    completion_pending: bool,
    current: Option<E>,
    state: IterState,
    error: Option<StreamError>,
}

impl<E: ContractEvent> EventIterator<E> {
    /// Open a feed for `query` on `source` and wrap it in a fresh,
    /// not-yet-advanced iterator.
    pub async fn open<S: LogSource + ?Sized>(
        source: &S,
        query: LogQuery,
    ) -> Result<Self, SourceError> {
        let feed = source.open_log_feed(&query).await?;
        Ok(Self::from_feed(feed))
    }

    /// Wrap an already-open feed.
    pub fn from_feed(feed: LogFeed) -> Self {
        Self {
            feed,
            completion_pending: true,
            current: None,
            state: IterState::Active,
            error: None,
        }
    }

    /// Advance to the next event, returning whether one was found.
    ///
    /// Waits for either the next record or a terminal signal from the
    /// source, whichever resolves first. After clean completion, serves
    /// any backlog still buffered in the channel without blocking, then
    /// returns `false` with no error. After any error, returns `false`
    /// forever; the error stays retrievable via [`EventIterator::error`].
    pub async fn advance(&mut self) -> bool {
        loop {
            match self.state {
                IterState::Failed | IterState::Exhausted => return false,

                IterState::Draining => match self.feed.logs.try_recv() {
                    Ok(log) => return self.store(log),
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {
                        self.state = IterState::Exhausted;
                        return false;
                    }
                },

                IterState::Active => {
                    if !self.completion_pending {
                        // Feed released early; whatever is buffered is all
                        // that is left.
                        self.state = IterState::Draining;
                        continue;
                    }
                    tokio::select! {
                        maybe_log = self.feed.logs.recv() => match maybe_log {
                            Some(log) => return self.store(log),
                            None => {
                                // Producer gone; the completion channel
                                // decides the outcome.
                                self.completion_pending = false;
                                match (&mut self.feed.completion).await.unwrap_or(Ok(())) {
                                    Ok(()) => {
                                        self.state = IterState::Exhausted;
                                        return false;
                                    }
                                    Err(e) => return self.fail(e),
                                }
                            }
                        },
                        outcome = &mut self.feed.completion => {
                            self.completion_pending = false;
                            match outcome.unwrap_or(Ok(())) {
                                Ok(()) => {
                                    debug!(event = E::NAME, "feed completed, draining backlog");
                                    self.state = IterState::Draining;
                                }
                                Err(e) => return self.fail(e),
                            }
                        }
                    }
                }
            }
        }
    }

    /// The event stored by the last `advance` that returned `true`.
    pub fn current(&self) -> Option<&E> {
        self.current.as_ref()
    }

    /// Take ownership of the current event, leaving the cursor empty until
    /// the next successful `advance`.
    pub fn take_current(&mut self) -> Option<E> {
        self.current.take()
    }

    /// The sticky error that stopped iteration, if any.
    pub fn error(&self) -> Option<&StreamError> {
        self.error.as_ref()
    }

    /// Whether the stream ended cleanly with every event consumed.
    pub fn is_exhausted(&self) -> bool {
        self.state == IterState::Exhausted
    }

    /// Release the underlying feed. Idempotent; never blocks. Does not
    /// clear a sticky error or the current event.
    pub fn close(&mut self) {
        self.feed.logs.close();
        self.completion_pending = false;
    }

    fn store(&mut self, log: chainbind_core::RawLog) -> bool {
        match E::decode(&log) {
            Ok(event) => {
                self.current = Some(event);
                true
            }
            Err(e) => self.fail(StreamError::Decode(e)),
        }
    }

    fn fail(&mut self, error: StreamError) -> bool {
        debug!(event = E::NAME, %error, "iterator entering failed state");
        self.state = IterState::Failed;
        self.error = Some(error);
        false
    }
}
