//! Push notifications via Pushover.
//!
//! Delivery is fire-and-forget from the caller's point of view: the tools log
//! and discard any `NotifyError`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::PushoverCredentials;

const PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Push service rejected message (status {status})")]
    Rejected { status: u16 },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn push(&self, message: &str) -> Result<(), NotifyError>;
}

pub struct PushoverNotifier {
    client: Client,
    endpoint: String,
    credentials: PushoverCredentials,
}

impl PushoverNotifier {
    pub fn new(credentials: PushoverCredentials) -> Result<Self, NotifyError> {
        Ok(Self {
            client: Client::builder().timeout(NOTIFY_TIMEOUT).build()?,
            endpoint: PUSHOVER_API_URL.to_string(),
            credentials,
        })
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn push(&self, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[
                ("token", self.credentials.token.as_str()),
                ("user", self.credentials.user.as_str()),
                ("message", message),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }
        debug!("Push notification delivered");
        Ok(())
    }
}

/// Used when Pushover credentials are not configured.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn push(&self, message: &str) -> Result<(), NotifyError> {
        debug!("Notifications disabled, dropping: {message}");
        Ok(())
    }
}
