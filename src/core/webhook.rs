//! Schedule webhook client.
//!
//! One POST per accepted `setup_schedule` call. Success is HTTP 200 exactly;
//! anything else, including other 2xx codes, is a failure.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Meeting details collected by the assistant, plus the caller's number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub name: String,
    pub email: String,
    pub datetime: String,
    pub description: String,
    pub phone_number: String,
}

/// Errors returned by the schedule webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Webhook answered with a status other than 200
    #[error("Webhook returned HTTP {0}")]
    Status(u16),

    /// Request could not be delivered
    #[error("Webhook request failed: {0}")]
    Transport(String),
}

/// Result type for webhook operations.
pub type WebhookResult<T> = Result<T, WebhookError>;

/// Destination for schedule requests.
#[async_trait]
pub trait ScheduleWebhook: Send + Sync {
    /// Deliver one schedule request.
    async fn setup_schedule(&self, request: &ScheduleRequest) -> WebhookResult<()>;
}

/// HTTP implementation of [`ScheduleWebhook`].
pub struct WebhookClient {
    url: String,
    client: reqwest::Client,
}

impl WebhookClient {
    /// Create a client posting to `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ScheduleWebhook for WebhookClient {
    async fn setup_schedule(&self, request: &ScheduleRequest) -> WebhookResult<()> {
        debug!(url = %self.url, "Posting schedule request");

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.url, error = %e, "Webhook request failed");
                WebhookError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(url = %self.url, status = %status, "Webhook returned non-200 status");
            return Err(WebhookError::Status(status.as_u16()));
        }

        Ok(())
    }
}
