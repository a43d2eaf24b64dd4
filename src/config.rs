//! Command line and environment configuration.
//!
//! Every credential can come from a flag or from the environment variable
//! named in its help text.  Clap only collects the raw values; [`Config::from_cli`]
//! is where the "refuse to start with an empty value" rule lives.

use std::fmt;

use clap::Parser;

use crate::error::ConfigError;
use crate::source::Credentials;

/// Subreddits watched when none are given.
pub const DEFAULT_SUBREDDITS: &str = "acturnips+ACNHTurnips";

#[derive(Debug, Parser)]
#[command(
    name = "turnipmon",
    version,
    about = "A little Animal Crossing NH turnip marketplace subreddit monitor, sending you phone notifications via IFTTT once a new turnip trade has been opened.",
    after_help = "http://github.com/klausklapper/turnipmon"
)]
pub struct Cli {
    /// Required. The IFTTT web hook event name to trigger.
    #[arg(short = 'n', long = "name", env = "IFTTT_EVENT_NAME")]
    pub event_name: Option<String>,

    /// Required. Your IFTTT web hook key (see https://ifttt.com/maker_webhooks).
    #[arg(short = 'k', long = "key", env = "IFTTT_KEY", hide_env_values = true)]
    pub webhook_key: Option<String>,

    /// Required. Your Reddit app API ID credential.
    #[arg(short = 'i', long = "id", env = "REDDIT_APP_ID")]
    pub app_id: Option<String>,

    /// Required. Your Reddit app API secret.
    #[arg(short = 's', long = "secret", env = "REDDIT_APP_SECRET", hide_env_values = true)]
    pub app_secret: Option<String>,

    /// Required. Your Reddit username.
    #[arg(short = 'u', long = "username", env = "REDDIT_USERNAME")]
    pub username: Option<String>,

    /// Required. Your Reddit password.
    #[arg(short = 'p', long = "password", env = "REDDIT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Subreddits to watch, joined with '+'.
    #[arg(long, env = "TURNIPMON_SUBREDDITS", default_value = DEFAULT_SUBREDDITS)]
    pub subreddits: String,

    /// Log level (trace, debug, info, warn, error). RUST_LOG directives still apply.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Don't clear the screen and print the header on start-up.
    #[arg(long)]
    pub no_banner: bool,

    /// Disable coloured ids and titles.
    #[arg(long)]
    pub no_color: bool,
}

/// Validated configuration.
#[derive(Clone)]
pub struct Config {
    pub event_name: String,
    pub webhook_key: String,
    pub credentials: Credentials,
    pub subreddits: String,
}

impl Config {
    /// Check that every required value is present and non-empty.
    ///
    /// Values are checked in the order they are documented so the operator
    /// fixes them one at a time, top to bottom.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let event_name = required(&cli.event_name, ConfigError::MissingEventName)?;
        let webhook_key = required(&cli.webhook_key, ConfigError::MissingWebhookKey)?;
        let app_id = required(&cli.app_id, ConfigError::MissingAppId)?;
        let app_secret = required(&cli.app_secret, ConfigError::MissingAppSecret)?;
        let username = required(&cli.username, ConfigError::MissingUsername)?;
        let password = required(&cli.password, ConfigError::MissingPassword)?;

        let subreddits = cli.subreddits.trim().trim_matches('+').to_string();
        if subreddits.is_empty() {
            return Err(ConfigError::MissingSubreddits);
        }

        Ok(Self {
            event_name,
            webhook_key,
            credentials: Credentials {
                app_id,
                app_secret,
                username,
                password,
            },
            subreddits,
        })
    }
}

fn required(value: &Option<String>, missing: ConfigError) -> Result<String, ConfigError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(missing),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("event_name", &self.event_name)
            .field("webhook_key", &"[REDACTED]")
            .field("credentials", &self.credentials)
            .field("subreddits", &self.subreddits)
            .finish()
    }
}
