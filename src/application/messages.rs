use std::sync::Arc;

use crate::application::error::ContentError;
use crate::application::notify::{Notification, Notifier, dispatch};
use crate::application::repos::{CreateMessageParams, MessagesRepo};
use crate::domain::entities::MessageRecord;
use crate::domain::validation::{FieldErrors, normalize_email};

#[derive(Debug, Clone, Default)]
pub struct MessageInput {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Contact-form inbox.
#[derive(Clone)]
pub struct MessageService {
    repo: Arc<dyn MessagesRepo>,
    notifier: Arc<dyn Notifier>,
}

impl MessageService {
    pub fn new(repo: Arc<dyn MessagesRepo>, notifier: Arc<dyn Notifier>) -> Self {
        Self { repo, notifier }
    }

    pub async fn submit(&self, input: MessageInput) -> Result<MessageRecord, ContentError> {
        let mut errors = FieldErrors::new();
        errors.require("name", &input.name, "Name is required");
        errors.require_email("email", &input.email);
        errors.require("subject", &input.subject, "Subject is required");
        errors.require("message", &input.message, "Message is required");
        errors.into_result()?;

        let record = self
            .repo
            .create_message(CreateMessageParams {
                name: input.name.trim().to_string(),
                email: normalize_email(&input.email),
                subject: input.subject.trim().to_string(),
                message: input.message.trim().to_string(),
            })
            .await?;

        dispatch(
            self.notifier.clone(),
            Notification::ContactMessage(record.clone()),
        );
        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<MessageRecord>, ContentError> {
        self.repo
            .list_messages(None)
            .await
            .map_err(ContentError::from)
    }
}
