//! Notification delivery backends.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::application::notify::{Notification, Notifier, NotifyError};
use crate::config::NotifySettings;

use super::error::InfraError;

/// Writes notifications to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            target = "infra::notify",
            event = notification.kind(),
            "notification recorded"
        );
        Ok(())
    }
}

/// Posts each notification as JSON to a configured endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    endpoint: Url,
}

impl WebhookNotifier {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, InfraError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::HttpClient(err.to_string()))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(notification)
            .send()
            .await
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        tracing::debug!(
            target = "infra::notify",
            event = notification.kind(),
            status = status.as_u16(),
            "webhook delivered"
        );
        Ok(())
    }
}

/// Webhook when configured, log-only otherwise.
pub fn from_settings(
    settings: &NotifySettings,
) -> Result<std::sync::Arc<dyn Notifier>, InfraError> {
    match &settings.webhook_url {
        Some(url) => Ok(std::sync::Arc::new(WebhookNotifier::new(
            url.clone(),
            settings.timeout,
        )?)),
        None => Ok(std::sync::Arc::new(LogNotifier)),
    }
}
