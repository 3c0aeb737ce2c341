//! Outbound notification channels.
//!
//! Alerts leave the service through three named targets: a business
//! Telegram channel, a developer Telegram channel and a Slack webhook.
//! Each target may be unconfigured, in which case a send succeeds
//! silently with a log line. The [`AlertSink`] trait is the seam the
//! alert manager talks to; [`Notifier`] is the production
//! implementation.

pub mod error;
pub mod slack;
pub mod telegram;

#[cfg(test)]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::telegram::TelegramTarget;

/// How long any single outbound HTTP call may take.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of response-body bytes surfaced in an error.
pub(crate) const MAX_ERROR_BODY: usize = 4096;

/// Delivery seam between the alert manager and the outside world.
///
/// Each operation is a one-shot fire with a bounded timeout. Callers
/// decide which failures are fatal; the sink itself never retries.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send_business(&self, message: &str) -> Result<()>;
    async fn send_developer(&self, message: &str) -> Result<()>;
    async fn send_slack(&self, message: &str) -> Result<()>;
}

/// Stateless fan-out to the configured notification endpoints.
pub struct Notifier {
    business: Option<TelegramTarget>,
    developer: Option<TelegramTarget>,
    slack_webhook: Option<String>,
    client: reqwest::Client,
}

impl Notifier {
    pub fn new(
        business: Option<TelegramTarget>,
        developer: Option<TelegramTarget>,
        slack_webhook: Option<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            business,
            developer,
            slack_webhook,
            client,
        }
    }

    pub fn business_configured(&self) -> bool {
        self.business.is_some()
    }

    pub fn developer_configured(&self) -> bool {
        self.developer.is_some()
    }

    pub fn slack_configured(&self) -> bool {
        self.slack_webhook.is_some()
    }
}

#[async_trait]
impl AlertSink for Notifier {
    async fn send_business(&self, message: &str) -> Result<()> {
        match &self.business {
            Some(target) => {
                telegram::send_message(&self.client, target, message).await?;
                Ok(())
            }
            None => {
                tracing::debug!("business alerts not configured, dropping message");
                Ok(())
            }
        }
    }

    async fn send_developer(&self, message: &str) -> Result<()> {
        match &self.developer {
            Some(target) => {
                telegram::send_message(&self.client, target, message).await?;
                Ok(())
            }
            None => {
                tracing::debug!("developer alerts not configured, dropping message");
                Ok(())
            }
        }
    }

    async fn send_slack(&self, message: &str) -> Result<()> {
        match &self.slack_webhook {
            Some(url) => {
                slack::send_message(&self.client, url, message).await?;
                Ok(())
            }
            None => {
                tracing::debug!("slack alerts not configured, dropping message");
                Ok(())
            }
        }
    }
}

/// Truncate a response body for inclusion in an error message.
pub(crate) fn truncate_body(body: &str, max_len: usize) -> String {
    if body.len() <= max_len {
        body.to_string()
    } else {
        let mut end = max_len;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated]", &body[..end])
    }
}
