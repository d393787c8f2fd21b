use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::error::ContentError;
use crate::application::projects::clean_list;
use crate::application::repos::{
    BlogsRepo, CreateBlogParams, CreateCommentParams, UpdateBlogParams, UpsertReactionParams,
};
use crate::domain::entities::{BlogRecord, BlogWithActivity, CommentRecord, ReactionRecord};
use crate::domain::types::ReactionOutcome;
use crate::domain::validation::{FieldErrors, non_blank, normalize_email};

const ENTITY: &str = "Blog";

#[derive(Debug, Clone, Default)]
pub struct BlogInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct CommentInput {
    pub name: String,
    pub email: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReactionInput {
    pub user_email: String,
    pub reaction: String,
}

#[derive(Clone)]
pub struct BlogService {
    repo: Arc<dyn BlogsRepo>,
}

impl BlogService {
    pub fn new(repo: Arc<dyn BlogsRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<BlogWithActivity>, ContentError> {
        self.repo.list_blogs().await.map_err(ContentError::from)
    }

    pub async fn get(&self, id: Uuid) -> Result<BlogWithActivity, ContentError> {
        self.repo
            .find_blog(id)
            .await?
            .ok_or(ContentError::not_found(ENTITY))
    }

    /// Publishes a post dated now.
    pub async fn create(&self, input: BlogInput) -> Result<BlogRecord, ContentError> {
        let (title, content) = match (non_blank(input.title), non_blank(input.content)) {
            (Some(title), Some(content)) => (title, content),
            (title, content) => {
                let mut errors = FieldErrors::new();
                if title.is_none() {
                    errors.push("title", "Title is required");
                }
                if content.is_none() {
                    errors.push("content", "Content is required");
                }
                return Err(errors.into());
            }
        };

        let record = self
            .repo
            .create_blog(CreateBlogParams {
                title,
                content,
                cover_image: non_blank(input.cover_image),
                tags: clean_list(input.tags).unwrap_or_default(),
                posted_date: OffsetDateTime::now_utc(),
            })
            .await?;

        tracing::info!(target = "application::blogs", id = %record.id, "blog created");
        Ok(record)
    }

    /// Applies the non-blank fields of `input`; everything else keeps its stored value.
    pub async fn update(&self, id: Uuid, input: BlogInput) -> Result<BlogRecord, ContentError> {
        let current = self.get(id).await?.blog;

        self.repo
            .update_blog(UpdateBlogParams {
                id,
                title: non_blank(input.title).unwrap_or(current.title),
                content: non_blank(input.content).unwrap_or(current.content),
                cover_image: non_blank(input.cover_image).or(current.cover_image),
                tags: clean_list(input.tags).unwrap_or(current.tags),
            })
            .await
            .map_err(|err| ContentError::from_repo(ENTITY, err))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ContentError> {
        self.repo
            .delete_blog(id)
            .await
            .map_err(|err| ContentError::from_repo(ENTITY, err))?;
        tracing::info!(target = "application::blogs", id = %id, "blog removed");
        Ok(())
    }

    /// Newest first. An unknown post simply has no comments.
    pub async fn comments(&self, blog_id: Uuid) -> Result<Vec<CommentRecord>, ContentError> {
        self.repo
            .list_comments(blog_id)
            .await
            .map_err(ContentError::from)
    }

    pub async fn add_comment(
        &self,
        blog_id: Uuid,
        input: CommentInput,
    ) -> Result<CommentRecord, ContentError> {
        let mut errors = FieldErrors::new();
        errors.require("name", &input.name, "Name is required");
        errors.require_email("email", &input.email);
        errors.require("comment", &input.comment, "Comment is required");
        errors.into_result()?;

        if !self.repo.blog_exists(blog_id).await? {
            return Err(ContentError::not_found(ENTITY));
        }

        self.repo
            .create_comment(CreateCommentParams {
                blog_id,
                name: input.name.trim().to_string(),
                email: normalize_email(&input.email),
                comment: input.comment.trim().to_string(),
            })
            .await
            .map_err(|err| ContentError::from_repo(ENTITY, err))
    }

    pub async fn reactions(&self, blog_id: Uuid) -> Result<Vec<ReactionRecord>, ContentError> {
        self.repo
            .list_reactions(blog_id)
            .await
            .map_err(ContentError::from)
    }

    /// One reaction per e-mail and post; a repeat replaces the earlier reaction.
    pub async fn react(
        &self,
        blog_id: Uuid,
        input: ReactionInput,
    ) -> Result<(ReactionRecord, ReactionOutcome), ContentError> {
        let mut errors = FieldErrors::new();
        errors.require_email("userEmail", &input.user_email);
        errors.require("reaction", &input.reaction, "Reaction is required");
        errors.into_result()?;

        if !self.repo.blog_exists(blog_id).await? {
            return Err(ContentError::not_found(ENTITY));
        }

        self.repo
            .upsert_reaction(UpsertReactionParams {
                blog_id,
                user_email: normalize_email(&input.user_email),
                reaction: input.reaction.trim().to_string(),
            })
            .await
            .map_err(|err| ContentError::from_repo(ENTITY, err))
    }
}
