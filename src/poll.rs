//! Background feed polling.
//!
//! [`Poller::run`] wakes every [`POLL_INTERVAL`], asks the feed for anything
//! newer than the cursor, forwards each new item to the notifier and then
//! moves the cursor to the newest item of the batch.
//!
//! ## Failure policy
//!
//! There is no local recovery.  The first fetch or notify error ends the
//! loop: the poller moves to [`PollState::Terminated`], cancels the shared
//! token so the lifecycle wakes up, and returns the error.  Because the
//! cursor is only replaced after *every* item of a batch was delivered, a
//! failed tick never leaves a half-advanced cursor behind.
//!
//! ## Serialization
//!
//! Ticks run inline in the loop body, never spawned, so at most one tick is
//! in flight and tick N's cursor is what tick N+1 starts from.  Cancellation
//! is only observed between ticks; an in-flight fetch or notification is
//! always allowed to finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cursor::Cursor;
use crate::error::MonitorError;
use crate::notifier::Notifier;
use crate::source::FeedClient;
use crate::ui;

/// How many items a single fetch asks for.
pub const FETCH_LIMIT: usize = 5;

/// Time between polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(90);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Waiting for the next tick.
    Idle,
    /// A tick is in progress.
    Polling,
    /// A tick failed; no further ticks will run.
    Terminated,
}

/// Result of one successful tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    /// Cursor to use for the next tick.
    pub cursor: Cursor,
    /// Number of notifications sent.
    pub notified: usize,
}

pub struct Poller {
    feed: Arc<dyn FeedClient>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    state: watch::Sender<PollState>,
}

impl Poller {
    pub fn new(feed: Arc<dyn FeedClient>, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(PollState::Idle);
        Self {
            feed,
            notifier,
            interval: POLL_INTERVAL,
            state,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Subscribe to state transitions.
    pub fn state(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    /// Run one poll against `cursor`.
    ///
    /// Items are notified in the order the feed returned them, one at a
    /// time.  On error nothing is returned, so the caller keeps its old cursor.
    pub async fn tick(&self, cursor: &Cursor) -> Result<TickOutcome, MonitorError> {
        debug!(cursor = %cursor, "Checking ...");

        let items = self
            .feed
            .fetch_recent(FETCH_LIMIT, Some(cursor.as_str()))
            .await
            .map_err(MonitorError::Poll)?;

        if items.is_empty() {
            debug!(
                "No new trades found. Next check in {} seconds",
                self.interval.as_secs()
            );
            return Ok(TickOutcome {
                cursor: cursor.clone(),
                notified: 0,
            });
        }

        info!(count = items.len(), "Found {} new trades!", items.len());
        for item in &items {
            info!(
                id = %item.id,
                "{}{} Notifying your phone ...",
                ui::id(&item.id),
                ui::title(&item.title)
            );
            self.notifier
                .notify(&item.title, &item.url)
                .await
                .map_err(|source| MonitorError::Notify {
                    id: item.id.clone(),
                    source,
                })?;
        }

        Ok(TickOutcome {
            cursor: cursor.advance(&items),
            notified: items.len(),
        })
    }

    /// Poll until `cancel` fires or a tick fails.
    ///
    /// The first poll happens one full interval after the call.  Returns the
    /// final cursor on a clean stop.
    pub async fn run(
        &self,
        mut cursor: Cursor,
        cancel: CancellationToken,
    ) -> Result<Cursor, MonitorError> {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(cursor = %cursor, "poller stopped");
                    return Ok(cursor);
                }
                _ = ticker.tick() => {}
            }

            self.state.send_replace(PollState::Polling);
            match self.tick(&cursor).await {
                Ok(outcome) => {
                    debug!(
                        notified = outcome.notified,
                        cursor = %outcome.cursor,
                        "tick complete"
                    );
                    cursor = outcome.cursor;
                    self.state.send_replace(PollState::Idle);
                }
                Err(e) => {
                    self.state.send_replace(PollState::Terminated);
                    cancel.cancel();
                    return Err(e);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
