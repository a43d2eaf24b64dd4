//! Outbound notifications via IFTTT Maker web hooks.
//!
//! One HTTP POST per item, JSON body `{value1, value2, value3}`.  There is no
//! retry and no queueing: a failed delivery is returned to the caller, and in
//! this program every caller treats it as fatal.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::NotifyError;

const IFTTT_BASE: &str = "https://maker.ifttt.com";

/// Icon sent as `value3` with every notification.
pub const ICON_URL: &str = "https://dodo.ac/np/images/8/86/Turnips_NH_Inv_Icon.png";

/// Delivers a single alert for a feed item.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, url: &str) -> Result<(), NotifyError>;
}

/// Web hook body; IFTTT only understands the three `valueN` ingredients.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct NotificationPayload<'a> {
    #[serde(rename = "value1")]
    pub title: &'a str,
    #[serde(rename = "value2")]
    pub url: &'a str,
    #[serde(rename = "value3")]
    pub icon_url: &'static str,
}

impl<'a> NotificationPayload<'a> {
    pub fn new(title: &'a str, url: &'a str) -> Self {
        Self {
            title,
            url,
            icon_url: ICON_URL,
        }
    }
}

/// [`Notifier`] that triggers an IFTTT Maker event.
pub struct IftttNotifier {
    client: Client,
    endpoint: String,
}

impl IftttNotifier {
    pub fn new(event_name: &str, key: &str) -> Result<Self, NotifyError> {
        Self::with_base_url(IFTTT_BASE, event_name, key)
    }

    /// Same as [`IftttNotifier::new`] but against another host.
    pub fn with_base_url(base: &str, event_name: &str, key: &str) -> Result<Self, NotifyError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: format!("{base}/trigger/{event_name}/with/key/{key}"),
        })
    }
}

#[async_trait]
impl Notifier for IftttNotifier {
    async fn notify(&self, title: &str, url: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&NotificationPayload::new(title, url))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // The body is diagnostics only; an unreadable one must not mask the status.
        let body = response.text().await.unwrap_or_default();
        tracing::error!(%status, %body, "IFTTT request failed");
        Err(NotifyError::Rejected { status, body })
    }
}
