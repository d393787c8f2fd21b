use std::str::FromStr;

use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    ActivityCounts, BlogCommentCount, BlogRef, CategoryCount, CommentWithBlog, ContentCounts,
    DashboardRepo, RepoError, TagCount,
};
use crate::domain::entities::CommentRecord;
use crate::domain::types::SkillCategory;

use super::PostgresRepositories;
use super::util::map_sqlx_error;

#[derive(Debug, FromRow)]
struct CountsRow {
    projects: i64,
    blogs: i64,
    comments: i64,
    messages: i64,
    subscribers: i64,
}

#[derive(Debug, FromRow)]
struct ActivityRow {
    projects: i64,
    blogs: i64,
    messages: i64,
    subscribers: i64,
}

#[derive(Debug, FromRow)]
struct RecentCommentRow {
    id: Uuid,
    blog_id: Uuid,
    name: String,
    email: String,
    comment: String,
    created_at: OffsetDateTime,
    blog_title: String,
}

#[derive(Debug, FromRow)]
struct CategoryCountRow {
    category: String,
    count: i64,
}

#[derive(Debug, FromRow)]
struct BlogCommentCountRow {
    id: Uuid,
    title: String,
    posted_date: OffsetDateTime,
    comment_count: i64,
}

#[derive(Debug, FromRow)]
struct TagCountRow {
    tag: String,
    count: i64,
}

#[async_trait]
impl DashboardRepo for PostgresRepositories {
    async fn content_counts(&self) -> Result<ContentCounts, RepoError> {
        let row = sqlx::query_as::<_, CountsRow>(
            "SELECT \
                (SELECT COUNT(*) FROM projects) AS projects, \
                (SELECT COUNT(*) FROM blogs) AS blogs, \
                (SELECT COUNT(*) FROM blog_comments) AS comments, \
                (SELECT COUNT(*) FROM messages) AS messages, \
                (SELECT COUNT(*) FROM subscribers) AS subscribers",
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ContentCounts {
            projects: Self::convert_count(row.projects)?,
            blogs: Self::convert_count(row.blogs)?,
            comments: Self::convert_count(row.comments)?,
            messages: Self::convert_count(row.messages)?,
            subscribers: Self::convert_count(row.subscribers)?,
        })
    }

    async fn recent_comments(&self, limit: usize) -> Result<Vec<CommentWithBlog>, RepoError> {
        let rows = sqlx::query_as::<_, RecentCommentRow>(
            "SELECT c.id, c.blog_id, c.name, c.email, c.comment, c.created_at, b.title AS blog_title \
             FROM blog_comments c \
             INNER JOIN blogs b ON b.id = c.blog_id \
             ORDER BY c.created_at DESC \
             LIMIT $1",
        )
        .bind(Self::convert_limit(limit))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| CommentWithBlog {
                blog: BlogRef {
                    id: row.blog_id,
                    title: row.blog_title,
                },
                comment: CommentRecord {
                    id: row.id,
                    blog_id: row.blog_id,
                    name: row.name,
                    email: row.email,
                    comment: row.comment,
                    created_at: row.created_at,
                },
            })
            .collect())
    }

    async fn skill_counts_by_category(&self) -> Result<Vec<CategoryCount>, RepoError> {
        let rows = sqlx::query_as::<_, CategoryCountRow>(
            "SELECT category, COUNT(*) AS count FROM skills GROUP BY category",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let mut counts = rows
            .into_iter()
            .map(|row| {
                let category =
                    SkillCategory::from_str(&row.category).map_err(|err| RepoError::Integrity {
                        message: err.to_string(),
                    })?;
                Ok(CategoryCount {
                    category,
                    count: Self::convert_count(row.count)?,
                })
            })
            .collect::<Result<Vec<_>, RepoError>>()?;
        counts.sort_by_key(|entry| entry.category);
        Ok(counts)
    }

    async fn activity_since(&self, since: OffsetDateTime) -> Result<ActivityCounts, RepoError> {
        let row = sqlx::query_as::<_, ActivityRow>(
            "SELECT \
                (SELECT COUNT(*) FROM projects WHERE created_at >= $1) AS projects, \
                (SELECT COUNT(*) FROM blogs WHERE created_at >= $1) AS blogs, \
                (SELECT COUNT(*) FROM messages WHERE created_at >= $1) AS messages, \
                (SELECT COUNT(*) FROM subscribers WHERE subscribed_at >= $1) AS subscribers",
        )
        .bind(since)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ActivityCounts {
            projects: Self::convert_count(row.projects)?,
            blogs: Self::convert_count(row.blogs)?,
            messages: Self::convert_count(row.messages)?,
            subscribers: Self::convert_count(row.subscribers)?,
        })
    }

    async fn blogs_with_comment_counts(
        &self,
        limit: usize,
    ) -> Result<Vec<BlogCommentCount>, RepoError> {
        let rows = sqlx::query_as::<_, BlogCommentCountRow>(
            "SELECT b.id, b.title, b.posted_date, COUNT(c.id) AS comment_count \
             FROM blogs b \
             LEFT JOIN blog_comments c ON c.blog_id = b.id \
             GROUP BY b.id \
             ORDER BY b.posted_date DESC \
             LIMIT $1",
        )
        .bind(Self::convert_limit(limit))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(BlogCommentCount {
                    id: row.id,
                    title: row.title,
                    posted_date: row.posted_date,
                    comment_count: Self::convert_count(row.comment_count)?,
                })
            })
            .collect()
    }

    async fn tag_usage(&self) -> Result<Vec<TagCount>, RepoError> {
        let rows = sqlx::query_as::<_, TagCountRow>(
            "SELECT tag, COUNT(*) AS count FROM blogs, unnest(tags) AS tag GROUP BY tag",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(TagCount {
                    tag: row.tag,
                    count: Self::convert_count(row.count)?,
                })
            })
            .collect()
    }
}
