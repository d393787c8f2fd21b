use std::{str::FromStr, sync::Arc};

use serde_json::Value;
use uuid::Uuid;

use crate::application::error::ContentError;
use crate::application::repos::{SkillParams, SkillsRepo};
use crate::domain::entities::SkillRecord;
use crate::domain::types::SkillCategory;
use crate::domain::validation::{FieldErrors, non_blank};

const ENTITY: &str = "Skill";
const PERCENTAGE_MESSAGE: &str = "Percentage must be an integer between 0 and 100";

/// `percentage` is kept as raw JSON so numeric strings are accepted like numbers.
#[derive(Debug, Clone, Default)]
pub struct SkillInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub percentage: Option<Value>,
}

#[derive(Clone)]
pub struct SkillService {
    repo: Arc<dyn SkillsRepo>,
}

impl SkillService {
    pub fn new(repo: Arc<dyn SkillsRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<SkillRecord>, ContentError> {
        self.repo.list_skills().await.map_err(ContentError::from)
    }

    pub async fn create(&self, input: SkillInput) -> Result<SkillRecord, ContentError> {
        let parsed = parse_input(input);

        let mut errors = parsed.errors;
        if parsed.name.is_none() {
            errors.push("name", "Name is required");
        }
        if parsed.category.is_none() && !errors.as_slice().iter().any(|e| e.field == "category") {
            errors.push("category", "Invalid category");
        }
        if parsed.percentage.is_none()
            && !errors.as_slice().iter().any(|e| e.field == "percentage")
        {
            errors.push("percentage", PERCENTAGE_MESSAGE);
        }

        let (Some(name), Some(category), Some(percentage), true) = (
            parsed.name,
            parsed.category,
            parsed.percentage,
            errors.is_empty(),
        ) else {
            return Err(errors.into());
        };

        self.repo
            .create_skill(SkillParams {
                name,
                category,
                percentage,
            })
            .await
            .map_err(ContentError::from)
    }

    /// Supplied fields must be valid; absent or blank ones keep their stored value.
    pub async fn update(&self, id: Uuid, input: SkillInput) -> Result<SkillRecord, ContentError> {
        let parsed = parse_input(input);
        parsed.errors.into_result()?;

        let current = self
            .repo
            .find_skill(id)
            .await?
            .ok_or(ContentError::not_found(ENTITY))?;

        self.repo
            .update_skill(
                id,
                SkillParams {
                    name: parsed.name.unwrap_or(current.name),
                    category: parsed.category.unwrap_or(current.category),
                    percentage: parsed.percentage.unwrap_or(current.percentage),
                },
            )
            .await
            .map_err(|err| ContentError::from_repo(ENTITY, err))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ContentError> {
        self.repo
            .delete_skill(id)
            .await
            .map_err(|err| ContentError::from_repo(ENTITY, err))
    }
}

struct ParsedSkill {
    name: Option<String>,
    category: Option<SkillCategory>,
    percentage: Option<i32>,
    errors: FieldErrors,
}

fn parse_input(input: SkillInput) -> ParsedSkill {
    let mut errors = FieldErrors::new();

    let category = match non_blank(input.category) {
        Some(raw) => match SkillCategory::from_str(&raw) {
            Ok(category) => Some(category),
            Err(_) => {
                errors.push("category", "Invalid category");
                None
            }
        },
        None => None,
    };

    let percentage = match input.percentage {
        None | Some(Value::Null) => None,
        Some(value) => match parse_percentage(&value) {
            Some(percentage) => Some(percentage),
            None => {
                errors.push("percentage", PERCENTAGE_MESSAGE);
                None
            }
        },
    };

    ParsedSkill {
        name: non_blank(input.name),
        category,
        percentage,
        errors,
    }
}

fn parse_percentage(value: &Value) -> Option<i32> {
    let raw = match value {
        Value::Number(number) => number.as_i64()?,
        Value::String(text) => text.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (0..=100).contains(&raw).then_some(raw as i32)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::infra::memory::InMemoryRepositories;

    fn input(name: &str, category: &str, percentage: Value) -> SkillInput {
        SkillInput {
            name: Some(name.into()),
            category: Some(category.into()),
            percentage: Some(percentage),
        }
    }

    #[test]
    fn percentage_accepts_integers_and_numeric_strings() {
        assert_eq!(parse_percentage(&json!(0)), Some(0));
        assert_eq!(parse_percentage(&json!("100")), Some(100));
        assert_eq!(parse_percentage(&json!(101)), None);
        assert_eq!(parse_percentage(&json!(-1)), None);
        assert_eq!(parse_percentage(&json!(50.5)), None);
        assert_eq!(parse_percentage(&json!(true)), None);
    }

    #[tokio::test]
    async fn create_rejects_unknown_category_once() {
        let service = SkillService::new(Arc::new(InMemoryRepositories::new()));
        let err = service
            .create(input("Rust", "Wizardry", json!(90)))
            .await
            .expect_err("invalid");

        let ContentError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.as_slice().len(), 1);
        assert_eq!(errors.as_slice()[0].message, "Invalid category");
    }

    #[tokio::test]
    async fn list_orders_by_category_then_name() {
        let service = SkillService::new(Arc::new(InMemoryRepositories::new()));
        for (name, category) in [
            ("React", "Frontend"),
            ("Axum", "Backend"),
            ("CSS", "Frontend"),
            ("Actix", "Backend"),
        ] {
            service
                .create(input(name, category, json!(80)))
                .await
                .expect("created");
        }

        let names: Vec<_> = service
            .list()
            .await
            .expect("listed")
            .into_iter()
            .map(|skill| skill.name)
            .collect();
        assert_eq!(names, vec!["Actix", "Axum", "CSS", "React"]);
    }

    #[tokio::test]
    async fn update_validates_supplied_fields_only() {
        let service = SkillService::new(Arc::new(InMemoryRepositories::new()));
        let skill = service
            .create(input("Docker", "Tool", json!(70)))
            .await
            .expect("created");

        let updated = service
            .update(
                skill.id,
                SkillInput {
                    percentage: Some(json!(85)),
                    ..Default::default()
                },
            )
            .await
            .expect("updated");
        assert_eq!(updated.percentage, 85);
        assert_eq!(updated.category, SkillCategory::Tool);

        let err = service
            .update(
                skill.id,
                SkillInput {
                    percentage: Some(json!(150)),
                    ..Default::default()
                },
            )
            .await
            .expect_err("invalid");
        assert!(matches!(err, ContentError::Validation(_)));
    }
}
