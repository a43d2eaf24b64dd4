//! Shared test doubles.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::StatusCode;
use tokio::sync::Notify;

use crate::error::{FetchError, NotifyError};
use crate::notifier::Notifier;
use crate::source::{FeedClient, FeedItem};

/// Fixed "now" used across tests.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 12, 15, 0, 0).unwrap()
}

/// A feed item created `minutes_ago` before [`now`].
pub fn item(id: &str, minutes_ago: i64) -> FeedItem {
    item_aged(id, Duration::minutes(minutes_ago))
}

pub fn item_aged(id: &str, age: Duration) -> FeedItem {
    FeedItem {
        id: id.to_string(),
        title: format!("title of {id}"),
        url: format!("https://www.reddit.com/comments/{id}/"),
        created_at: now() - age,
    }
}

/// Feed client that replays queued responses in order.
///
/// Once the script runs out it keeps answering with an empty batch.
#[derive(Default)]
pub struct ScriptedFeed {
    responses: Mutex<VecDeque<Result<Vec<FeedItem>, FetchError>>>,
    calls: Mutex<Vec<(usize, Option<String>)>>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_items(self, items: Vec<FeedItem>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(items));
        self
    }

    pub fn then_error(self, error: FetchError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// `(limit, before)` of every call so far.
    pub fn calls(&self) -> Vec<(usize, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedClient for ScriptedFeed {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_recent(
        &self,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<FeedItem>, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((limit, before.map(String::from)));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Feed that behaves like a live listing: new posts go on top, and
/// `before` returns the items closest to (and newer than) the cursor.
pub struct GrowingFeed {
    items: Mutex<Vec<FeedItem>>,
    posted: Mutex<usize>,
}

impl GrowingFeed {
    /// `items` must be newest-first.
    pub fn new(items: Vec<FeedItem>) -> Self {
        Self {
            items: Mutex::new(items),
            posted: Mutex::new(0),
        }
    }

    /// Publish a new post on top of the feed.
    pub fn post(&self) {
        let mut posted = self.posted.lock().unwrap();
        *posted += 1;
        let new = item(&format!("t3_{:03}", *posted), 0);
        self.items.lock().unwrap().insert(0, new);
    }

    pub fn head_id(&self) -> String {
        self.items.lock().unwrap()[0].id.clone()
    }
}

#[async_trait]
impl FeedClient for GrowingFeed {
    fn name(&self) -> &str {
        "growing"
    }

    async fn fetch_recent(
        &self,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<FeedItem>, FetchError> {
        let items = self.items.lock().unwrap();
        let newer = match before {
            None => return Ok(items.iter().take(limit).cloned().collect()),
            Some(id) => match items.iter().position(|i| i.id == id) {
                Some(pos) => &items[..pos],
                None => &items[..0],
            },
        };
        let skip = newer.len().saturating_sub(limit);
        Ok(newer[skip..].to_vec())
    }
}

/// Feed whose fetches stall until [`release`](Self::release) is called,
/// then answer with an empty batch.  Never released, it never answers.
#[derive(Default)]
pub struct StalledFeed {
    gate: Notify,
    calls: Mutex<usize>,
}

impl StalledFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let one pending (or the next) fetch complete.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl FeedClient for StalledFeed {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn fetch_recent(
        &self,
        _limit: usize,
        _before: Option<&str>,
    ) -> Result<Vec<FeedItem>, FetchError> {
        *self.calls.lock().unwrap() += 1;
        self.gate.notified().await;
        Ok(Vec::new())
    }
}

/// Notifier that records deliveries and can be told to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    attempts: Mutex<usize>,
    fail_on_attempt: Option<usize>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`th call (zero-based) with a 500 rejection.
    pub fn failing_on(n: usize) -> Self {
        Self {
            fail_on_attempt: Some(n),
            ..Self::default()
        }
    }

    /// Successfully delivered `(title, url)` pairs.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_titles(&self) -> Vec<String> {
        self.sent().into_iter().map(|(title, _)| title).collect()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, title: &str, url: &str) -> Result<(), NotifyError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let current = *attempts;
            *attempts += 1;
            current
        };
        if self.fail_on_attempt == Some(attempt) {
            return Err(NotifyError::Rejected {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), url.to_string()));
        Ok(())
    }
}

/// Serve `router` on an ephemeral local port; returns its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
