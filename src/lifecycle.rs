//! Process lifecycle: fast-forward, poll, shut down.
//!
//! Shutdown has two possible causes, an external signal or a fatal poller
//! error, and both end up as the same [`CancellationToken`] firing.  The
//! poller is then allowed to finish whatever it is doing before [`run`]
//! returns.
//!
//! The shutdown future is watched from the very start, so a signal that
//! arrives while fast-forward is still waiting on the feed ends the process
//! cleanly.  Start-up work cut short that way is simply dropped; no cursor
//! exists yet, so nothing can be lost.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::MonitorError;
use crate::fast_forward::fast_forward;
use crate::notifier::Notifier;
use crate::poll::Poller;
use crate::source::FeedClient;

/// Fast-forward, then poll every `interval` until `shutdown` resolves or a
/// tick fails.
///
/// `Ok(())` means a clean, signal-initiated shutdown.
pub async fn run<S>(
    feed: Arc<dyn FeedClient>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    shutdown: S,
) -> Result<(), MonitorError>
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let cursor = tokio::select! {
        result = fast_forward(feed.as_ref(), notifier.as_ref(), Utc::now()) => result?,
        _ = &mut shutdown => {
            info!("Shutdown requested during start-up ...");
            return Ok(());
        }
    };

    let cancel = CancellationToken::new();
    let poller = Poller::new(feed, notifier).with_interval(interval);
    let polling = poller.run(cursor, cancel.clone());
    tokio::pin!(polling);

    let outcome = tokio::select! {
        result = &mut polling => result,
        _ = &mut shutdown => {
            info!("Shutdown requested ...");
            cancel.cancel();
            polling.await
        }
    };

    let state = *poller.state().borrow();
    debug!(?state, "poller finished");

    let cursor = outcome?;
    info!(cursor = %cursor, "Goodbye!");
    Ok(())
}

/// Resolves on Ctrl-C, or on SIGTERM where that exists.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
