//! Error types for the monitor.
//!
//! The taxonomy is small on purpose: [`FetchError`] for anything the feed
//! client reports, [`NotifyError`] for web hook delivery, and
//! [`MonitorError`] which wraps both and records *which step* failed so the
//! operator-facing message is unambiguous.  Every `MonitorError` is fatal.

use reqwest::StatusCode;
use thiserror::Error;

/// The feed source was unreachable or rejected the request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network, TLS or connection-level failure.
    #[error("request to feed failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The token endpoint refused the configured credentials.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The feed answered with a non-success status.
    #[error("feed responded with HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The response body did not have the expected shape.
    #[error("could not decode feed response: {0}")]
    Decode(String),
}

/// The web hook call failed or was refused.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("web hook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer; status and body are kept for diagnostics.
    #[error("web hook responded with HTTP {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// A fatal error from the monitoring loop, tagged with the failing step.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("fast forward failed: {0}")]
    FastForward(#[source] FetchError),

    #[error("feed returned no items; check the subreddit names")]
    EmptyFeed,

    #[error("polling for new items failed: {0}")]
    Poll(#[source] FetchError),

    #[error("notification for {id} failed: {source}")]
    Notify {
        id: String,
        #[source]
        source: NotifyError,
    },
}

/// A required configuration value was missing or empty.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing IFTTT web hook event name. Use the --help argument for more information.")]
    MissingEventName,
    #[error("Missing IFTTT web hook key. Use the --help argument for more information.")]
    MissingWebhookKey,
    #[error("Missing Reddit app ID. Use the --help argument for more information.")]
    MissingAppId,
    #[error("Missing Reddit app secret. Use the --help argument for more information.")]
    MissingAppSecret,
    #[error("Missing Reddit username. Use the --help argument for more information.")]
    MissingUsername,
    #[error("Missing Reddit password. Use the --help argument for more information.")]
    MissingPassword,
    #[error("At least one subreddit must be given.")]
    MissingSubreddits,
}
