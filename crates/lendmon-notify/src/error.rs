/// Errors from the notification subsystem.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// An HTTP request to a notification endpoint failed outright.
    #[error("notify: HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("notify: {service} returned status {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Payload serialization failed.
    #[error("notify: JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NotifyError>;
