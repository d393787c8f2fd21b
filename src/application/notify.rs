//! Outbound notifications for the site owner.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::entities::{MessageRecord, SubscriberRecord};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    ContactMessage(MessageRecord),
    NewSubscriber(SubscriberRecord),
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::ContactMessage(_) => "contact_message",
            Notification::NewSubscriber(_) => "new_subscriber",
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(String),
    #[error("notification rejected with status {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Sends in the background; failures are logged and never reach the caller.
pub fn dispatch(notifier: std::sync::Arc<dyn Notifier>, notification: Notification) {
    tokio::spawn(async move {
        if let Err(err) = notifier.notify(&notification).await {
            tracing::warn!(
                target = "application::notify",
                kind = notification.kind(),
                error = %err,
                "notification delivery failed"
            );
        }
    });
}
