use async_trait::async_trait;
use sqlx::{FromRow, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreateProjectParams, ProjectsRepo, RepoError, UpdateProjectParams,
};
use crate::application::search::SearchPredicate;
use crate::domain::entities::ProjectRecord;

use super::PostgresRepositories;
use super::predicate::push_search_filter;
use super::util::{expect_one_row, map_sqlx_error};

const PROJECT_COLUMNS: &str = "id, title, description, tech_stack, github_link, live_link, \
    image_url, created_at, updated_at";

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: Uuid,
    title: String,
    description: String,
    tech_stack: Vec<String>,
    github_link: Option<String>,
    live_link: Option<String>,
    image_url: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ProjectRow> for ProjectRecord {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            tech_stack: row.tech_stack,
            github_link: row.github_link,
            live_link: row.live_link,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ProjectsRepo for PostgresRepositories {
    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ProjectRecord::from).collect())
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<ProjectRecord>, RepoError> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ProjectRecord::from))
    }

    async fn create_project(
        &self,
        params: CreateProjectParams,
    ) -> Result<ProjectRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "INSERT INTO projects (id, title, description, tech_stack, github_link, live_link, \
             image_url, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) \
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(params.title)
        .bind(params.description)
        .bind(params.tech_stack)
        .bind(params.github_link)
        .bind(params.live_link)
        .bind(params.image_url)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_project(
        &self,
        params: UpdateProjectParams,
    ) -> Result<ProjectRecord, RepoError> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "UPDATE projects SET title = $2, description = $3, tech_stack = $4, \
             github_link = $5, live_link = $6, image_url = $7, updated_at = $8 \
             WHERE id = $1 RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.title)
        .bind(params.description)
        .bind(params.tech_stack)
        .bind(params.github_link)
        .bind(params.live_link)
        .bind(params.image_url)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_project(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        expect_one_row(result)
    }

    async fn search_projects(
        &self,
        predicate: &SearchPredicate,
    ) -> Result<Vec<ProjectRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {PROJECT_COLUMNS} FROM projects"));
        push_search_filter(&mut qb, predicate);
        qb.push(" ORDER BY created_at DESC");

        let rows = qb
            .build_query_as::<ProjectRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ProjectRecord::from).collect())
    }
}
