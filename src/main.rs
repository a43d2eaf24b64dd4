//! turnipmon: a subreddit monitor that forwards every new post to an IFTTT
//! web hook, exactly once.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────────┐ cursor ┌──────────┐ notify() ┌─────────────┐
//! │fast_forward.rs│ ─────► │ poll.rs  │ ───────► │ notifier.rs │
//! │  (start-up)   │        │ (ticks)  │          │   (IFTTT)   │
//! └───────────────┘        └──────────┘          └─────────────┘
//!         │                     │ fetch_recent()
//!         └──────────┬──────────┘
//!                    ▼
//!              ┌──────────┐
//!              │ source/  │
//!              │ (Reddit) │
//!              └──────────┘
//! ```
//!
//! * **`source/`**: the `FeedClient` trait and the Reddit implementation.
//! * **`cursor`**: the dedup watermark passed from tick to tick.
//! * **`fast_forward`**: seeds the cursor from the feed head on start-up.
//! * **`poll`**: the fixed-interval poll-and-notify loop.
//! * **`notifier`**: the outbound web hook.
//! * **`lifecycle`**: runs the above until a signal or a fatal error.
//! * **`main`**: wires everything together: parse args, set up logging, and
//!   turn the outcome into an exit code.

mod config;
mod cursor;
mod error;
mod fast_forward;
mod lifecycle;
mod logging;
mod notifier;
mod poll;
mod source;
#[cfg(test)]
mod test_utils;
mod ui;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};

use config::{Cli, Config};
use notifier::IftttNotifier;
use source::RedditSource;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // -- terminal and logging ------------------------------------------------
    ui::set_color(!cli.no_color);
    if !cli.no_banner {
        // Cosmetic only; a terminal that can't be cleared is not fatal.
        let _ = ui::banner();
    }
    logging::init(&cli.log_level, !cli.no_color);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    // -- configuration -------------------------------------------------------
    let config = Config::from_cli(cli)?;
    info!(
        "Configuration parsed! Event: {}, Key: [REDACTED]",
        config.event_name
    );
    debug!(?config);

    // -- collaborators -------------------------------------------------------
    info!(subreddits = %config.subreddits, "Connecting to Reddit ...");
    let feed = RedditSource::new(config.credentials.clone(), config.subreddits.as_str())
        .context("failed to set up the Reddit client")?;
    let notifier = IftttNotifier::new(&config.event_name, &config.webhook_key)
        .context("failed to set up the IFTTT client")?;

    // -- monitor until Ctrl-C / SIGTERM or a fatal error ---------------------
    lifecycle::run(
        Arc::new(feed),
        Arc::new(notifier),
        poll::POLL_INTERVAL,
        lifecycle::shutdown_signal(),
    )
    .await?;

    Ok(())
}
