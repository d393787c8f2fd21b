//! Skills and services.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{RepoError, ServiceParams, ServicesRepo, SkillParams, SkillsRepo};
use crate::domain::entities::{ServiceRecord, SkillRecord};
use crate::domain::types::SkillCategory;

use super::PostgresRepositories;
use super::util::{expect_one_row, map_sqlx_error};

const SKILL_COLUMNS: &str = "id, name, category, percentage, created_at, updated_at";
const SERVICE_COLUMNS: &str = "id, title, description, icon, created_at, updated_at";

#[derive(Debug, FromRow)]
struct SkillRow {
    id: Uuid,
    name: String,
    category: String,
    percentage: i32,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<SkillRow> for SkillRecord {
    type Error = RepoError;

    fn try_from(row: SkillRow) -> Result<Self, Self::Error> {
        let category = SkillCategory::from_str(&row.category).map_err(|err| {
            RepoError::Integrity {
                message: err.to_string(),
            }
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            category,
            percentage: row.percentage,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ServiceRow {
    id: Uuid,
    title: String,
    description: String,
    icon: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ServiceRow> for ServiceRecord {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            icon: row.icon,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl SkillsRepo for PostgresRepositories {
    async fn list_skills(&self) -> Result<Vec<SkillRecord>, RepoError> {
        let rows = sqlx::query_as::<_, SkillRow>(&format!(
            "SELECT {SKILL_COLUMNS} FROM skills ORDER BY category COLLATE \"C\" ASC, name COLLATE \"C\" ASC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(SkillRecord::try_from).collect()
    }

    async fn find_skill(&self, id: Uuid) -> Result<Option<SkillRecord>, RepoError> {
        let row = sqlx::query_as::<_, SkillRow>(&format!(
            "SELECT {SKILL_COLUMNS} FROM skills WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(SkillRecord::try_from).transpose()
    }

    async fn create_skill(&self, params: SkillParams) -> Result<SkillRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, SkillRow>(&format!(
            "INSERT INTO skills (id, name, category, percentage, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {SKILL_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(params.name)
        .bind(params.category.as_str())
        .bind(params.percentage)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.try_into()
    }

    async fn update_skill(&self, id: Uuid, params: SkillParams) -> Result<SkillRecord, RepoError> {
        let row = sqlx::query_as::<_, SkillRow>(&format!(
            "UPDATE skills SET name = $2, category = $3, percentage = $4, updated_at = $5 \
             WHERE id = $1 RETURNING {SKILL_COLUMNS}"
        ))
        .bind(id)
        .bind(params.name)
        .bind(params.category.as_str())
        .bind(params.percentage)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.try_into()
    }

    async fn delete_skill(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        expect_one_row(result)
    }
}

#[async_trait]
impl ServicesRepo for PostgresRepositories {
    async fn list_services(&self) -> Result<Vec<ServiceRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services ORDER BY created_at ASC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ServiceRecord::from).collect())
    }

    async fn find_service(&self, id: Uuid) -> Result<Option<ServiceRecord>, RepoError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ServiceRecord::from))
    }

    async fn create_service(&self, params: ServiceParams) -> Result<ServiceRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "INSERT INTO services (id, title, description, icon, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(params.title)
        .bind(params.description)
        .bind(params.icon)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_service(
        &self,
        id: Uuid,
        params: ServiceParams,
    ) -> Result<ServiceRecord, RepoError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "UPDATE services SET title = $2, description = $3, icon = $4, updated_at = $5 \
             WHERE id = $1 RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(id)
        .bind(params.title)
        .bind(params.description)
        .bind(params.icon)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_service(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        expect_one_row(result)
    }
}
