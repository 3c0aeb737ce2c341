use serde_json::json;

use crate::error::{NotifyError, Result};
use crate::{truncate_body, MAX_ERROR_BODY};

/// A bot token / chat id pair identifying one Telegram destination.
#[derive(Debug, Clone)]
pub struct TelegramTarget {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramTarget {
    /// Builds a target from optionally-present credentials. Both parts
    /// are required; anything else yields `None` so the sink can fall
    /// back to a logged no-op.
    pub fn from_parts(bot_token: Option<String>, chat_id: Option<String>) -> Option<Self> {
        match (bot_token, chat_id) {
            (Some(bot_token), Some(chat_id)) if !bot_token.is_empty() && !chat_id.is_empty() => {
                Some(Self { bot_token, chat_id })
            }
            _ => None,
        }
    }
}

pub(crate) async fn send_message(
    client: &reqwest::Client,
    target: &TelegramTarget,
    message: &str,
) -> Result<()> {
    let url = format!(
        "https://api.telegram.org/bot{}/sendMessage",
        target.bot_token
    );
    let payload = json!({
        "chat_id": target.chat_id,
        "text": message,
    });

    let resp = client.post(&url).json(&payload).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(NotifyError::Api {
            service: "telegram",
            status: status.as_u16(),
            body: truncate_body(&body, MAX_ERROR_BODY),
        });
    }

    Ok(())
}
