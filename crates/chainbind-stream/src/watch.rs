//! Push-based event subscriptions.
//!
//! `watch` spawns one background task per feed. The task decodes each
//! arriving record and forwards it to the caller's sink, racing every
//! blocked delivery against the feed's completion signal and the cancel
//! handle — whichever resolves first decides the outcome, and the pending
//! delivery is abandoned. A decode failure stops the task immediately;
//! there is no automatic resubscription.

use chainbind_core::{ContractEvent, SourceError, StreamError};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::query::LogQuery;
use crate::source::{LogFeed, LogSource};

/// Handle to a running watch task.
///
/// Cancellation is cooperative: it takes effect at the task's next
/// suspension point. Dropping the handle also cancels. The task's outcome
/// is reported exactly once, through [`WatchHandle::join`].
#[derive(Debug)]
pub struct WatchHandle {
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<(), StreamError>>,
}

impl WatchHandle {
    /// Ask the task to stop. The task releases its feed and finishes with
    /// `Ok(())`. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            // The task may already have finished on its own.
            let _ = tx.send(());
        }
    }

    /// Wait for the task to finish and return its outcome: `Ok(())` after
    /// cancellation or clean source completion, the terminal error
    /// otherwise.
    pub async fn join(mut self) -> Result<(), StreamError> {
        // Disarm the drop-cancel; joining is an explicit wait.
        let cancel = self.cancel.take();
        let outcome = match (&mut self.task).await {
            Ok(res) => res,
            Err(e) => Err(StreamError::Subscription {
                reason: format!("watch task aborted: {e}"),
            }),
        };
        drop(cancel);
        outcome
    }

    /// Whether the background task has finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }
}

/// Open a feed for `query` and forward each decoded event into `sink`
/// until the source completes, an error occurs, or the returned handle is
/// cancelled.
pub async fn watch<E, S>(
    source: &S,
    query: LogQuery,
    sink: mpsc::Sender<E>,
) -> Result<WatchHandle, SourceError>
where
    E: ContractEvent,
    S: LogSource + ?Sized,
{
    let feed = source.open_log_feed(&query).await?;
    Ok(spawn_watch(feed, sink))
}

/// Spawn the forwarding task over an already-open feed.
pub fn spawn_watch<E: ContractEvent>(feed: LogFeed, sink: mpsc::Sender<E>) -> WatchHandle {
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let task = tokio::spawn(watch_loop(feed, sink, cancel_rx));
    WatchHandle {
        cancel: Some(cancel_tx),
        task,
    }
}

async fn watch_loop<E: ContractEvent>(
    feed: LogFeed,
    sink: mpsc::Sender<E>,
    mut cancel: oneshot::Receiver<()>,
) -> Result<(), StreamError> {
    let LogFeed {
        mut logs,
        mut completion,
    } = feed;

    loop {
        tokio::select! {
            maybe_log = logs.recv() => {
                let Some(log) = maybe_log else {
                    // Producer gone; completion decides the outcome.
                    return (&mut completion).await.unwrap_or(Ok(()));
                };
                let event = E::decode(&log).map_err(StreamError::Decode)?;

                // Biased toward delivery: an immediately-acceptable send is
                // never skipped. Only a blocked delivery races completion
                // and cancellation.
                tokio::select! {
                    biased;
                    sent = sink.send(event) => {
                        if sent.is_err() {
                            // Sink receiver dropped: nobody is listening,
                            // stop forwarding as if cancelled.
                            debug!(event = E::NAME, "watch sink closed, stopping");
                            return Ok(());
                        }
                    }
                    outcome = &mut completion => return outcome.unwrap_or(Ok(())),
                    _ = &mut cancel => {
                        debug!(event = E::NAME, "watch cancelled during delivery");
                        return Ok(());
                    }
                }
            }
            outcome = &mut completion => match outcome.unwrap_or(Ok(())) {
                Err(e) => return Err(e),
                Ok(()) => {
                    debug!(event = E::NAME, "feed completed, draining backlog");
                    return drain(&mut logs, &sink, &mut cancel).await;
                }
            },
            _ = &mut cancel => {
                debug!(event = E::NAME, "watch cancelled");
                return Ok(());
            }
        }
    }
}

/// Forward whatever is already buffered after clean completion, without
/// waiting for new records. Deliveries still race against cancellation.
async fn drain<E: ContractEvent>(
    logs: &mut mpsc::Receiver<chainbind_core::RawLog>,
    sink: &mpsc::Sender<E>,
    cancel: &mut oneshot::Receiver<()>,
) -> Result<(), StreamError> {
    loop {
        let Ok(log) = logs.try_recv() else {
            return Ok(());
        };
        let event = E::decode(&log).map_err(StreamError::Decode)?;
        tokio::select! {
            biased;
            sent = sink.send(event) => {
                if sent.is_err() {
                    return Ok(());
                }
            }
            _ = &mut *cancel => return Ok(()),
        }
    }
}
