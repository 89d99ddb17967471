//! Email delivery through the Brevo transactional API.

use std::time::Instant;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EmailConfig;

pub const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Brevo API error {status}: {body}")]
    Status { status: u16, body: String },
}

/// A named mailbox.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

impl Contact {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EmailPayload<'a> {
    sender: &'a Contact,
    to: [&'a Contact; 1],
    subject: &'a str,
    text_content: &'a str,
}

/// `"<prefix> — <D Month, YYYY>"`, dated in `tz`.
pub fn subject(prefix: &str, now: DateTime<Utc>, tz: Tz) -> String {
    format!("{prefix} — {}", now.with_timezone(&tz).format("%-d %B, %Y"))
}

/// Email body for a question block.
pub fn body(question: &str) -> String {
    format!("{question}\n")
}

/// Sends plain-text mail from a fixed sender to a fixed recipient.
pub struct Notifier {
    client: reqwest::Client,
    config: EmailConfig,
}

impl Notifier {
    pub fn new(config: &EmailConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("journal-prompt/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(DeliveryError::Client)?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Submit one message. Any status of 300 or above is a failure.
    pub async fn send(&self, subject: &str, text: &str) -> Result<(), DeliveryError> {
        let payload = EmailPayload {
            sender: &self.config.sender,
            to: [&self.config.recipient],
            subject,
            text_content: text,
        };

        let start = Instant::now();
        let resp = self
            .client
            .post(&self.config.endpoint)
            .header("accept", "application/json")
            .header("api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(DeliveryError::Request)?;

        let status = resp.status();
        debug!(
            "Email API: HTTP {} in {:.1}s",
            status,
            start.elapsed().as_secs_f64()
        );

        if status.as_u16() >= 300 {
            let body = resp.text().await.map_err(DeliveryError::Request)?;
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
