//! Mention-relay Slack infrastructure adapter.
//!
//! Implements the [`relay::MessageDelivery`] port over a Slack incoming
//! webhook: the renderer-agnostic [`NotificationMessage`] is rendered to
//! mrkdwn text plus Block Kit blocks (see [`render`]) and posted as a single
//! JSON payload. Exactly one transport attempt per delivery; retry policy is
//! deliberately absent from this system.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Slack wire format, display defaults, escaping, and
//! transport details all live here; the [`relay`] crate sees only
//! [`relay::MessageDelivery`].

pub mod render;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use relay::{MessageDelivery, NotificationMessage, RelayError};

/// Bot display name used when no override is configured.
pub const DEFAULT_USERNAME: &str = "Github Mention To Slack";

/// Bot icon used when no icon URL override is configured.
pub const DEFAULT_ICON_EMOJI: &str = ":octocat:";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures while posting to the webhook.
#[derive(Debug, Error)]
pub enum SlackError {
    /// The webhook answered with a non-success status.
    #[error("webhook returned HTTP {status}")]
    Status { status: StatusCode },

    /// The request never produced a usable response.
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Display overrides from the action inputs.
///
/// An empty string means "use the default" — the Actions runner hands unset
/// inputs through as empty strings, so empty and absent must behave the same.
#[derive(Debug, Clone, Default)]
pub struct DisplayOverrides {
    pub username: Option<String>,
    pub icon_url: Option<String>,
}

/// The webhook post body.
///
/// `icon_url` and `icon_emoji` are mutually exclusive: the configured icon URL
/// wins, the default emoji is only sent without one.
#[derive(Debug, Serialize)]
struct PostPayload<'a> {
    blocks: Vec<render::Block>,
    text: String,
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_emoji: Option<&'a str>,
}

/// A configured Slack incoming-webhook client.
pub struct SlackWebhook {
    client: Client,
    webhook_url: String,
    username: String,
    icon_url: Option<String>,
}

impl SlackWebhook {
    pub fn new(
        webhook_url: impl Into<String>,
        overrides: DisplayOverrides,
    ) -> Result<Self, SlackError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let username = match overrides.username {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_USERNAME.to_string(),
        };
        let icon_url = overrides.icon_url.filter(|url| !url.is_empty());
        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
            username,
            icon_url,
        })
    }

    fn payload(&self, message: &NotificationMessage) -> PostPayload<'_> {
        PostPayload {
            blocks: render::render_blocks(message),
            text: render::render_mrkdwn(message),
            username: &self.username,
            icon_url: self.icon_url.as_deref(),
            icon_emoji: match self.icon_url {
                Some(_) => None,
                None => Some(DEFAULT_ICON_EMOJI),
            },
        }
    }

    /// Posts one message. One attempt, no retry.
    pub async fn post(&self, message: &NotificationMessage) -> Result<(), SlackError> {
        let payload = self.payload(message);
        debug!(text = %payload.text, "posting notification to the webhook");

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SlackError::Status { status });
        }
        Ok(())
    }
}

#[async_trait]
impl MessageDelivery for SlackWebhook {
    async fn deliver(&self, message: &NotificationMessage) -> Result<(), RelayError> {
        self.post(message).await.map_err(|error| {
            RelayError::DeliveryError {
                detail: error.to_string(),
            }
        })
    }
}
