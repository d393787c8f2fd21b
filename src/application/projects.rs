use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::ContentError;
use crate::application::repos::{CreateProjectParams, ProjectsRepo, UpdateProjectParams};
use crate::domain::entities::ProjectRecord;
use crate::domain::validation::{FieldErrors, non_blank};

const ENTITY: &str = "Project";

/// Fields accepted when creating or editing a project. Blank values are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct ProjectInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub github_link: Option<String>,
    pub live_link: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Clone)]
pub struct ProjectService {
    repo: Arc<dyn ProjectsRepo>,
}

impl ProjectService {
    pub fn new(repo: Arc<dyn ProjectsRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<ProjectRecord>, ContentError> {
        self.repo.list_projects().await.map_err(ContentError::from)
    }

    pub async fn get(&self, id: Uuid) -> Result<ProjectRecord, ContentError> {
        self.repo
            .find_project(id)
            .await?
            .ok_or(ContentError::not_found(ENTITY))
    }

    pub async fn create(&self, input: ProjectInput) -> Result<ProjectRecord, ContentError> {
        let title = non_blank(input.title);
        let description = non_blank(input.description);
        let tech_stack = clean_list(input.tech_stack);

        let (title, description, tech_stack) = match (title, description, tech_stack) {
            (Some(title), Some(description), Some(tech_stack)) => (title, description, tech_stack),
            (title, description, tech_stack) => {
                let mut errors = FieldErrors::new();
                if title.is_none() {
                    errors.push("title", "Title is required");
                }
                if description.is_none() {
                    errors.push("description", "Description is required");
                }
                if tech_stack.is_none() {
                    errors.push("techStack", "Tech stack is required");
                }
                return Err(errors.into());
            }
        };

        let record = self
            .repo
            .create_project(CreateProjectParams {
                title,
                description,
                tech_stack,
                github_link: non_blank(input.github_link),
                live_link: non_blank(input.live_link),
                image_url: non_blank(input.image_url),
            })
            .await?;

        tracing::info!(
            target = "application::projects",
            id = %record.id,
            "project created"
        );
        Ok(record)
    }

    /// Applies the non-blank fields of `input`; everything else keeps its stored value.
    pub async fn update(&self, id: Uuid, input: ProjectInput) -> Result<ProjectRecord, ContentError> {
        let current = self.get(id).await?;

        let params = UpdateProjectParams {
            id,
            title: non_blank(input.title).unwrap_or(current.title),
            description: non_blank(input.description).unwrap_or(current.description),
            tech_stack: clean_list(input.tech_stack).unwrap_or(current.tech_stack),
            github_link: non_blank(input.github_link).or(current.github_link),
            live_link: non_blank(input.live_link).or(current.live_link),
            image_url: non_blank(input.image_url).or(current.image_url),
        };

        self.repo
            .update_project(params)
            .await
            .map_err(|err| ContentError::from_repo(ENTITY, err))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ContentError> {
        self.repo
            .delete_project(id)
            .await
            .map_err(|err| ContentError::from_repo(ENTITY, err))?;
        tracing::info!(target = "application::projects", id = %id, "project removed");
        Ok(())
    }
}

/// Trims entries and drops blanks; `None` when nothing usable remains.
pub(crate) fn clean_list(values: Option<Vec<String>>) -> Option<Vec<String>> {
    let cleaned: Vec<String> = values?
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::InMemoryRepositories;

    fn service() -> ProjectService {
        ProjectService::new(Arc::new(InMemoryRepositories::new()))
    }

    fn input(title: &str, description: &str, stack: &[&str]) -> ProjectInput {
        ProjectInput {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            tech_stack: Some(stack.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_reports_every_missing_field() {
        let err = service()
            .create(ProjectInput::default())
            .await
            .expect_err("invalid");

        let ContentError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = errors.as_slice().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["title", "description", "techStack"]);
    }

    #[tokio::test]
    async fn update_keeps_values_for_blank_fields() {
        let service = service();
        let created = service
            .create(ProjectInput {
                github_link: Some("https://github.com/me/app".to_string()),
                ..input("App", "Does things", &["Rust"])
            })
            .await
            .expect("created");

        let updated = service
            .update(
                created.id,
                ProjectInput {
                    title: Some("".to_string()),
                    description: Some("Does more things".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("updated");

        assert_eq!(updated.title, "App");
        assert_eq!(updated.description, "Does more things");
        assert_eq!(updated.tech_stack, vec!["Rust"]);
        assert_eq!(updated.github_link.as_deref(), Some("https://github.com/me/app"));
    }

    #[tokio::test]
    async fn missing_project_is_not_found() {
        let service = service();
        let id = Uuid::new_v4();
        assert!(matches!(
            service.get(id).await,
            Err(ContentError::NotFound { entity: "Project" })
        ));
        assert!(matches!(
            service.delete(id).await,
            Err(ContentError::NotFound { .. })
        ));
    }

    #[test]
    fn clean_list_drops_blank_entries() {
        assert_eq!(
            clean_list(Some(vec![" a ".into(), "".into(), "b".into()])),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(clean_list(Some(vec!["  ".into()])), None);
    }
}
