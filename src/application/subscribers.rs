use std::sync::Arc;

use crate::application::error::ContentError;
use crate::application::notify::{Notification, Notifier, dispatch};
use crate::application::repos::{CreateSubscriberParams, RepoError, SubscribersRepo};
use crate::domain::entities::SubscriberRecord;
use crate::domain::validation::{FieldErrors, non_blank, normalize_email};

#[derive(Debug, Clone, Default)]
pub struct SubscribeInput {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct SubscriberService {
    repo: Arc<dyn SubscribersRepo>,
    notifier: Arc<dyn Notifier>,
}

impl SubscriberService {
    pub fn new(repo: Arc<dyn SubscribersRepo>, notifier: Arc<dyn Notifier>) -> Self {
        Self { repo, notifier }
    }

    pub async fn subscribe(&self, input: SubscribeInput) -> Result<SubscriberRecord, ContentError> {
        let mut errors = FieldErrors::new();
        errors.require_email("email", &input.email);
        errors.into_result()?;

        let record = self
            .repo
            .create_subscriber(CreateSubscriberParams {
                email: normalize_email(&input.email),
                name: non_blank(input.name),
            })
            .await
            .map_err(|err| match err {
                RepoError::Duplicate { .. } => ContentError::Conflict("Email already subscribed"),
                other => ContentError::Repo(other),
            })?;

        dispatch(
            self.notifier.clone(),
            Notification::NewSubscriber(record.clone()),
        );
        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<SubscriberRecord>, ContentError> {
        self.repo.list_subscribers().await.map_err(ContentError::from)
    }
}
