use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::ContentError;
use crate::application::repos::{ServiceParams, ServicesRepo};
use crate::domain::entities::ServiceRecord;
use crate::domain::validation::{FieldErrors, non_blank};

const ENTITY: &str = "Service";

#[derive(Debug, Clone, Default)]
pub struct ServiceInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Offered services shown on the portfolio.
#[derive(Clone)]
pub struct ServiceCatalog {
    repo: Arc<dyn ServicesRepo>,
}

impl ServiceCatalog {
    pub fn new(repo: Arc<dyn ServicesRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<ServiceRecord>, ContentError> {
        self.repo.list_services().await.map_err(ContentError::from)
    }

    pub async fn create(&self, input: ServiceInput) -> Result<ServiceRecord, ContentError> {
        let (title, description) = match (non_blank(input.title), non_blank(input.description)) {
            (Some(title), Some(description)) => (title, description),
            (title, description) => {
                let mut errors = FieldErrors::new();
                if title.is_none() {
                    errors.push("title", "Title is required");
                }
                if description.is_none() {
                    errors.push("description", "Description is required");
                }
                return Err(errors.into());
            }
        };

        self.repo
            .create_service(ServiceParams {
                title,
                description,
                icon: non_blank(input.icon),
            })
            .await
            .map_err(ContentError::from)
    }

    pub async fn update(&self, id: Uuid, input: ServiceInput) -> Result<ServiceRecord, ContentError> {
        let current = self
            .repo
            .find_service(id)
            .await?
            .ok_or(ContentError::not_found(ENTITY))?;

        self.repo
            .update_service(
                id,
                ServiceParams {
                    title: non_blank(input.title).unwrap_or(current.title),
                    description: non_blank(input.description).unwrap_or(current.description),
                    icon: non_blank(input.icon).or(current.icon),
                },
            )
            .await
            .map_err(|err| ContentError::from_repo(ENTITY, err))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ContentError> {
        self.repo
            .delete_service(id)
            .await
            .map_err(|err| ContentError::from_repo(ENTITY, err))
    }
}
