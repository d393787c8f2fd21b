use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    BlogsRepo, CreateBlogParams, CreateCommentParams, RepoError, UpdateBlogParams,
    UpsertReactionParams,
};
use crate::application::search::SearchPredicate;
use crate::domain::entities::{BlogRecord, BlogWithActivity, CommentRecord, ReactionRecord};
use crate::domain::types::ReactionOutcome;

use super::PostgresRepositories;
use super::predicate::push_search_filter;
use super::util::{expect_one_row, map_sqlx_error};

const BLOG_COLUMNS: &str =
    "id, title, content, cover_image, posted_date, tags, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, blog_id, name, email, comment, created_at";
const REACTION_COLUMNS: &str = "id, blog_id, user_email, reaction, created_at, updated_at";

#[derive(Debug, FromRow)]
struct BlogRow {
    id: Uuid,
    title: String,
    content: String,
    cover_image: Option<String>,
    posted_date: OffsetDateTime,
    tags: Vec<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<BlogRow> for BlogRecord {
    fn from(row: BlogRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            cover_image: row.cover_image,
            posted_date: row.posted_date,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CommentRow {
    id: Uuid,
    blog_id: Uuid,
    name: String,
    email: String,
    comment: String,
    created_at: OffsetDateTime,
}

impl From<CommentRow> for CommentRecord {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            blog_id: row.blog_id,
            name: row.name,
            email: row.email,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ReactionRow {
    id: Uuid,
    blog_id: Uuid,
    user_email: String,
    reaction: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ReactionRow> for ReactionRecord {
    fn from(row: ReactionRow) -> Self {
        Self {
            id: row.id,
            blog_id: row.blog_id,
            user_email: row.user_email,
            reaction: row.reaction,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct UpsertedReactionRow {
    #[sqlx(flatten)]
    reaction: ReactionRow,
    inserted: bool,
}

impl PostgresRepositories {
    /// Loads comments (newest first, optionally capped per post) and reactions
    /// for `blogs` and attaches them, preserving the order of `blogs`.
    async fn attach_activity(
        &self,
        blogs: Vec<BlogRecord>,
        comment_limit: Option<usize>,
    ) -> Result<Vec<BlogWithActivity>, RepoError> {
        if blogs.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = blogs.iter().map(|blog| blog.id).collect();

        let comments = match comment_limit {
            Some(limit) => {
                sqlx::query_as::<_, CommentRow>(&format!(
                    "SELECT {COMMENT_COLUMNS} FROM ( \
                        SELECT {COMMENT_COLUMNS}, \
                               ROW_NUMBER() OVER (PARTITION BY blog_id ORDER BY created_at DESC) AS comment_rank \
                        FROM blog_comments WHERE blog_id = ANY($1) \
                     ) ranked WHERE comment_rank <= $2 ORDER BY created_at DESC"
                ))
                .bind(&ids)
                .bind(Self::convert_limit(limit))
                .fetch_all(self.pool())
                .await
            }
            None => {
                sqlx::query_as::<_, CommentRow>(&format!(
                    "SELECT {COMMENT_COLUMNS} FROM blog_comments \
                     WHERE blog_id = ANY($1) ORDER BY created_at DESC"
                ))
                .bind(&ids)
                .fetch_all(self.pool())
                .await
            }
        }
        .map_err(map_sqlx_error)?;

        let reactions = sqlx::query_as::<_, ReactionRow>(&format!(
            "SELECT {REACTION_COLUMNS} FROM blog_reactions \
             WHERE blog_id = ANY($1) ORDER BY created_at ASC"
        ))
        .bind(&ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let mut comments_by_blog: HashMap<Uuid, Vec<CommentRecord>> = HashMap::new();
        for row in comments {
            comments_by_blog
                .entry(row.blog_id)
                .or_default()
                .push(row.into());
        }
        let mut reactions_by_blog: HashMap<Uuid, Vec<ReactionRecord>> = HashMap::new();
        for row in reactions {
            reactions_by_blog
                .entry(row.blog_id)
                .or_default()
                .push(row.into());
        }

        Ok(blogs
            .into_iter()
            .map(|blog| BlogWithActivity {
                comments: comments_by_blog.remove(&blog.id).unwrap_or_default(),
                reactions: reactions_by_blog.remove(&blog.id).unwrap_or_default(),
                blog,
            })
            .collect())
    }
}

#[async_trait]
impl BlogsRepo for PostgresRepositories {
    async fn list_blogs(&self) -> Result<Vec<BlogWithActivity>, RepoError> {
        let rows = sqlx::query_as::<_, BlogRow>(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs ORDER BY posted_date DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.attach_activity(rows.into_iter().map(BlogRecord::from).collect(), None)
            .await
    }

    async fn find_blog(&self, id: Uuid) -> Result<Option<BlogWithActivity>, RepoError> {
        let row = sqlx::query_as::<_, BlogRow>(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut found = self.attach_activity(vec![row.into()], None).await?;
        Ok(found.pop())
    }

    async fn blog_exists(&self, id: Uuid) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM blogs WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn create_blog(&self, params: CreateBlogParams) -> Result<BlogRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, BlogRow>(&format!(
            "INSERT INTO blogs (id, title, content, cover_image, posted_date, tags, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) RETURNING {BLOG_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(params.title)
        .bind(params.content)
        .bind(params.cover_image)
        .bind(params.posted_date)
        .bind(params.tags)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_blog(&self, params: UpdateBlogParams) -> Result<BlogRecord, RepoError> {
        let row = sqlx::query_as::<_, BlogRow>(&format!(
            "UPDATE blogs SET title = $2, content = $3, cover_image = $4, tags = $5, updated_at = $6 \
             WHERE id = $1 RETURNING {BLOG_COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.title)
        .bind(params.content)
        .bind(params.cover_image)
        .bind(params.tags)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_blog(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        expect_one_row(result)
    }

    async fn search_blogs(
        &self,
        predicate: &SearchPredicate,
        comment_limit: usize,
    ) -> Result<Vec<BlogWithActivity>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {BLOG_COLUMNS} FROM blogs"));
        push_search_filter(&mut qb, predicate);
        qb.push(" ORDER BY posted_date DESC");

        let rows = qb
            .build_query_as::<BlogRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        self.attach_activity(
            rows.into_iter().map(BlogRecord::from).collect(),
            Some(comment_limit),
        )
        .await
    }

    async fn list_comments(&self, blog_id: Uuid) -> Result<Vec<CommentRecord>, RepoError> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM blog_comments WHERE blog_id = $1 ORDER BY created_at DESC"
        ))
        .bind(blog_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CommentRecord::from).collect())
    }

    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "INSERT INTO blog_comments (id, blog_id, name, email, comment, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(params.blog_id)
        .bind(params.name)
        .bind(params.email)
        .bind(params.comment)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(|err| match map_sqlx_error(err) {
            RepoError::InvalidInput { .. } => RepoError::NotFound,
            other => other,
        })?;

        Ok(row.into())
    }

    async fn list_reactions(&self, blog_id: Uuid) -> Result<Vec<ReactionRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ReactionRow>(&format!(
            "SELECT {REACTION_COLUMNS} FROM blog_reactions WHERE blog_id = $1 ORDER BY created_at ASC"
        ))
        .bind(blog_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ReactionRecord::from).collect())
    }

    async fn upsert_reaction(
        &self,
        params: UpsertReactionParams,
    ) -> Result<(ReactionRecord, ReactionOutcome), RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, UpsertedReactionRow>(&format!(
            "INSERT INTO blog_reactions (id, blog_id, user_email, reaction, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) \
             ON CONFLICT ON CONSTRAINT blog_reactions_blog_user_key \
             DO UPDATE SET reaction = EXCLUDED.reaction, updated_at = EXCLUDED.updated_at \
             RETURNING {REACTION_COLUMNS}, (xmax = 0) AS inserted"
        ))
        .bind(Uuid::new_v4())
        .bind(params.blog_id)
        .bind(params.user_email)
        .bind(params.reaction)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(|err| match map_sqlx_error(err) {
            RepoError::InvalidInput { .. } => RepoError::NotFound,
            other => other,
        })?;

        let outcome = if row.inserted {
            ReactionOutcome::Created
        } else {
            ReactionOutcome::Updated
        };
        Ok((row.reaction.into(), outcome))
    }
}
