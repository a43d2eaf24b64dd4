//! Feed client abstraction layer.
//!
//! This module defines the [`FeedClient`] trait and the common [`FeedItem`]
//! type.  The only concrete client is [`RedditSource`]; the monitor itself is
//! source-agnostic and talks to the trait.
//!
//! ## Ordering contract
//!
//! Every implementation returns items **newest-first**.  The fast-forward
//! step and the poll scheduler both treat the first element of a batch as
//! the authoritative head and move the cursor to it, so an implementation
//! that returned oldest-first would make the cursor go backwards.
//!
//! ## For contributors: adding a new feed client
//!
//! 1. Create a new file in this directory (e.g. `lemmy.rs`).
//! 2. Define a struct (e.g. `LemmySource`) and implement [`FeedClient`] for it.
//!    Keep the newest-first order and honour `before`.
//! 3. Add `mod lemmy;` below and re-export the struct in the `pub use` block.
//! 4. Construct it in `main.rs` in place of [`RedditSource`].
//!
//! Fast-forward, polling and dedup only ever see the trait.

mod feed_item;
mod reddit;

pub use feed_item::FeedItem;
pub use reddit::{Credentials, RedditSource};

use async_trait::async_trait;

use crate::error::FetchError;

/// Trait that every feed client must implement.
///
/// Implementations are shared between the fast-forward step and the
/// background poller, so they must be [`Send`] + [`Sync`].
///
/// `#[async_trait]` keeps the trait object-safe so the lifecycle can hold an
/// `Arc<dyn FeedClient>`.
///
/// ## Implementing a new client
///
/// ```ignore
/// pub struct MySource { /* config fields */ }
///
/// #[async_trait]
/// impl FeedClient for MySource {
///     fn name(&self) -> &str { "my-source" }
///
///     async fn fetch_recent(
///         &self,
///         limit: usize,
///         before: Option<&str>,
///     ) -> Result<Vec<FeedItem>, FetchError> {
///         // Ask the upstream for items newer than `before`, newest-first,
///         // then convert them into FeedItem values.
///         todo!()
///     }
/// }
/// ```
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Human-readable label for log lines.
    fn name(&self) -> &str;

    /// Fetch at most `limit` of the most recent items, newest-first.
    ///
    /// With `before` set, only items strictly more recent than that id are
    /// returned; an empty vector means nothing new has been posted.
    async fn fetch_recent(
        &self,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<FeedItem>, FetchError>;
}
