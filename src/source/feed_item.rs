//! The core data type produced by the feed client.
//!
//! `FeedItem` is one post from the monitored feed, normalised from whatever
//! the source returns (currently a Reddit listing child).  Everything
//! downstream (fast-forward, polling, notification) only sees this type.

use chrono::{DateTime, Duration, Utc};

/// A single feed entry.
///
/// Items are immutable once fetched; the monitor only ever reads them.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FeedItem {
    /// Feed-assigned unique identifier, ordered by recency at the source.
    ///
    /// For Reddit this is the post fullname (e.g. `t3_abc123`), which is also
    /// what the listing API accepts as its `before` cursor.
    pub id: String,

    /// Human-readable headline.
    pub title: String,

    /// Link forwarded to the notifier.
    pub url: String,

    /// Creation time reported by the feed.
    pub created_at: DateTime<Utc>,
}

impl FeedItem {
    /// How long ago this item was created, relative to `now`.
    ///
    /// Negative when the feed reports a timestamp in the future (clock skew).
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.created_at)
    }
}
