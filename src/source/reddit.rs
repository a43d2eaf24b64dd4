//! Reddit feed client.
//!
//! Reads the `new` listing of one or more subreddits through Reddit's OAuth
//! API.  Authentication uses the "script app" password grant: the app id and
//! secret go in HTTP basic auth, the account username and password in the
//! form body.  The bearer token is cached until shortly before it expires.
//!
//! The listing endpoint already returns posts newest-first, both with and
//! without a `before` cursor, which is exactly the [`FeedClient`] ordering
//! contract, so no re-sorting happens here.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{FeedClient, FeedItem};
use crate::error::FetchError;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

/// Reddit rejects requests with generic user agents.
const USER_AGENT: &str = concat!(
    "turnipmon/",
    env!("CARGO_PKG_VERSION"),
    " (subreddit monitor)"
);

/// Tokens are refreshed this long before Reddit says they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Reddit script-app credentials.
#[derive(Clone)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// A [`FeedClient`] backed by a subreddit's `new` listing.
pub struct RedditSource {
    client: Client,
    credentials: Credentials,
    /// Subreddit path segment; several subs are joined with `+`.
    subreddits: String,
    label: String,
    token_url: String,
    api_base: String,
    token: Mutex<Option<AccessToken>>,
}

impl RedditSource {
    /// Create a client for `subreddits` (e.g. `acturnips+ACNHTurnips`).
    ///
    /// No network traffic happens here; the first fetch authenticates.
    pub fn new(
        credentials: Credentials,
        subreddits: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        let subreddits = subreddits.into();

        Ok(Self {
            client,
            credentials,
            label: format!("r/{subreddits}"),
            subreddits,
            token_url: TOKEN_URL.to_string(),
            api_base: API_BASE.to_string(),
            token: Mutex::new(None),
        })
    }

    /// Point the client at different token and API hosts.
    #[cfg(test)]
    pub fn with_endpoints(
        mut self,
        token_url: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        self.token_url = token_url.into();
        self.api_base = api_base.into();
        self
    }

    /// Return a cached bearer token, requesting a new one when needed.
    async fn access_token(&self) -> Result<String, FetchError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.request_token().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn request_token(&self) -> Result<AccessToken, FetchError> {
        tracing::debug!(url = %self.token_url, "requesting Reddit access token");

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.credentials.app_id, Some(&self.credentials.app_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Auth(format!("HTTP {status}: {body}")));
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;
        parsed.into_access_token(Instant::now())
    }

    async fn forget_token(&self) {
        *self.token.lock().await = None;
    }
}

#[async_trait]
impl FeedClient for RedditSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch_recent(
        &self,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<FeedItem>, FetchError> {
        let token = self.access_token().await?;

        let url = format!("{}/r/{}/new", self.api_base, self.subreddits);
        let mut query = vec![("limit", limit.to_string()), ("raw_json", "1".to_string())];
        if let Some(before) = before {
            query.push(("before", before.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::UNAUTHORIZED {
            self.forget_token().await;
            return Err(FetchError::Auth(format!("listing refused the token: {body}")));
        }
        if !status.is_success() {
            return Err(FetchError::Status { status, body });
        }

        let mut items = parse_listing(&body)?;
        items.truncate(limit);
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

impl TokenResponse {
    /// Reddit reports bad credentials as `{"error": "invalid_grant"}` with a
    /// 200 status, so the body decides success.
    fn into_access_token(self, now: Instant) -> Result<AccessToken, FetchError> {
        if let Some(error) = self.error {
            return Err(FetchError::Auth(error));
        }
        let value = self
            .access_token
            .ok_or_else(|| FetchError::Auth("token response has no access_token".into()))?;
        let lifetime = Duration::from_secs(self.expires_in.unwrap_or(3600));

        Ok(AccessToken {
            value,
            expires_at: now + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN),
        })
    }
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    name: String,
    title: String,
    url: String,
    created_utc: f64,
}

/// Parse a listing response body into [`FeedItem`]s, preserving order.
///
/// Pure function (no I/O) so the decoding can be tested without a server.
pub fn parse_listing(body: &str) -> Result<Vec<FeedItem>, FetchError> {
    let listing: Listing =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    listing
        .data
        .children
        .into_iter()
        .map(|child| {
            let post = child.data;
            let millis = (post.created_utc * 1000.0).round() as i64;
            let created_at = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
                FetchError::Decode(format!("{} has an out of range created_utc", post.name))
            })?;

            Ok(FeedItem {
                id: post.name,
                title: post.title,
                url: post.url,
                created_at,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
