use serde_json::json;

use crate::error::{NotifyError, Result};
use crate::{truncate_body, MAX_ERROR_BODY};

pub(crate) async fn send_message(
    client: &reqwest::Client,
    webhook_url: &str,
    message: &str,
) -> Result<()> {
    let payload = json!({ "text": html_to_mrkdwn(message) });

    let resp = client.post(webhook_url).json(&payload).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(NotifyError::Api {
            service: "slack",
            status: status.as_u16(),
            body: truncate_body(&body, MAX_ERROR_BODY),
        });
    }

    Ok(())
}

/// Converts the HTML formatting used by the Telegram messages into
/// Slack mrkdwn: `<b>` -> `*`, `<i>` -> `_`, `<code>` -> `` ` ``.
pub fn html_to_mrkdwn(html: &str) -> String {
    html.replace("<b>", "*")
        .replace("</b>", "*")
        .replace("<i>", "_")
        .replace("</i>", "_")
        .replace("<code>", "`")
        .replace("</code>", "`")
}
