//! The dedup watermark.
//!
//! A [`Cursor`] is the id of the last feed item that has been fully
//! processed.  It lives in memory only and is owned by whoever runs the
//! poll loop; ticks borrow it and hand back its successor.

use std::fmt;

use crate::source::FeedItem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    /// Seed the cursor from the head of a newest-first batch.
    ///
    /// Returns `None` for an empty batch.
    pub fn from_head(batch: &[FeedItem]) -> Option<Self> {
        batch.first().map(|item| Self(item.id.clone()))
    }

    /// The cursor after a fully processed batch of items newer than `self`.
    ///
    /// An empty batch leaves the cursor where it is.
    pub fn advance(&self, batch: &[FeedItem]) -> Self {
        Self::from_head(batch).unwrap_or_else(|| self.clone())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
