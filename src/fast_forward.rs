//! Start-up fast-forward.
//!
//! Instead of replaying history, the monitor seeds its cursor from whatever
//! is at the top of the feed right now.  The head item is still forwarded if
//! it is younger than [`FRESHNESS_WINDOW`], on the assumption that it was
//! posted while the monitor was down and is still actionable.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::cursor::Cursor;
use crate::error::MonitorError;
use crate::notifier::Notifier;
use crate::poll::FETCH_LIMIT;
use crate::source::FeedClient;
use crate::ui;

/// Head items younger than this are notified on start-up (exclusive bound).
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(30 * 60);

/// Fetch the feed head, notify for it if fresh, and return the seeded cursor.
pub async fn fast_forward(
    feed: &dyn FeedClient,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> Result<Cursor, MonitorError> {
    info!(feed = feed.name(), "Fast forwarding to latest posts ...");

    let items = feed
        .fetch_recent(FETCH_LIMIT, None)
        .await
        .map_err(MonitorError::FastForward)?;
    let cursor = Cursor::from_head(&items).ok_or(MonitorError::EmptyFeed)?;
    let head = &items[0];

    info!(
        id = %head.id,
        "Fast forwarded to {}{}",
        ui::id(&head.id),
        ui::title(&head.title)
    );

    if is_fresh(head.age(now)) {
        info!(
            id = %head.id,
            "Last post {} created within the last 30 minutes. Notifying your phone ...",
            ui::id(&head.id)
        );
        notifier
            .notify(&head.title, &head.url)
            .await
            .map_err(|source| MonitorError::Notify {
                id: head.id.clone(),
                source,
            })?;
    } else {
        warn!(
            id = %head.id,
            "Last post {} is older than 30 minutes. Assuming it's already expired, no phone notification will be sent.",
            ui::id(&head.id)
        );
    }

    info!("All caught up.");
    Ok(cursor)
}

/// Negative ages (feed clock ahead of ours) count as fresh.
fn is_fresh(age: chrono::Duration) -> bool {
    match age.to_std() {
        Ok(age) => age < FRESHNESS_WINDOW,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::error::FetchError;
    use crate::test_utils::{item, item_aged, now, RecordingNotifier, ScriptedFeed};

    async fn run_with_head_age(age: Duration) -> (Cursor, RecordingNotifier) {
        let feed = ScriptedFeed::new()
            .then_items(vec![item_aged("t3_head", age), item("t3_prev", 90)]);
        let notifier = RecordingNotifier::new();
        let cursor = fast_forward(&feed, &notifier, now()).await.unwrap();
        (cursor, notifier)
    }

    #[tokio::test]
    async fn fresh_head_is_notified_once() {
        let (cursor, notifier) =
            run_with_head_age(Duration::minutes(29) + Duration::seconds(59)).await;

        assert_eq!(cursor.as_str(), "t3_head");
        assert_eq!(
            notifier.sent(),
            vec![(
                "title of t3_head".to_string(),
                "https://www.reddit.com/comments/t3_head/".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn stale_head_is_not_notified() {
        let (cursor, notifier) =
            run_with_head_age(Duration::minutes(30) + Duration::seconds(1)).await;

        assert_eq!(cursor.as_str(), "t3_head");
        assert_eq!(notifier.attempts(), 0);
    }

    #[tokio::test]
    async fn exactly_thirty_minutes_is_stale() {
        let (_, notifier) = run_with_head_age(Duration::minutes(30)).await;
        assert_eq!(notifier.attempts(), 0);
    }

    #[tokio::test]
    async fn future_timestamp_counts_as_fresh() {
        let (_, notifier) = run_with_head_age(Duration::seconds(-5)).await;
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn fetches_head_without_cursor() {
        let feed = ScriptedFeed::new().then_items(vec![item("t3_head", 120)]);
        fast_forward(&feed, &RecordingNotifier::new(), now()).await.unwrap();

        assert_eq!(feed.calls(), vec![(FETCH_LIMIT, None)]);
    }

    #[tokio::test]
    async fn empty_feed_is_fatal() {
        let feed = ScriptedFeed::new().then_items(vec![]);
        let err = fast_forward(&feed, &RecordingNotifier::new(), now())
            .await
            .unwrap_err();

        assert!(matches!(err, MonitorError::EmptyFeed));
    }

    #[tokio::test]
    async fn fetch_failure_is_fatal() {
        let feed = ScriptedFeed::new().then_error(FetchError::Auth("invalid_grant".into()));
        let err = fast_forward(&feed, &RecordingNotifier::new(), now())
            .await
            .unwrap_err();

        assert!(matches!(err, MonitorError::FastForward(FetchError::Auth(_))));
    }

    #[tokio::test]
    async fn notify_failure_is_fatal() {
        let feed = ScriptedFeed::new().then_items(vec![item("t3_head", 1)]);
        let err = fast_forward(&feed, &RecordingNotifier::failing_on(0), now())
            .await
            .unwrap_err();

        assert!(matches!(err, MonitorError::Notify { ref id, .. } if id == "t3_head"));
    }
}
