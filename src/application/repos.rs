//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::search::SearchPredicate;
use crate::domain::entities::{
    BlogRecord, BlogWithActivity, CommentRecord, MessageRecord, ProjectRecord, ReactionRecord,
    ServiceRecord, SessionRecord, SkillRecord, SubscriberRecord, UserRecord,
};
use crate::domain::types::{ReactionOutcome, SkillCategory};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateProjectParams {
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub github_link: Option<String>,
    pub live_link: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateProjectParams {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub github_link: Option<String>,
    pub live_link: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateBlogParams {
    pub title: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub posted_date: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct UpdateBlogParams {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CreateCommentParams {
    pub blog_id: Uuid,
    pub name: String,
    pub email: String,
    pub comment: String,
}

#[derive(Debug, Clone)]
pub struct UpsertReactionParams {
    pub blog_id: Uuid,
    pub user_email: String,
    pub reaction: String,
}

#[derive(Debug, Clone)]
pub struct SkillParams {
    pub name: String,
    pub category: SkillCategory,
    pub percentage: i32,
}

#[derive(Debug, Clone)]
pub struct ServiceParams {
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateSubscriberParams {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateMessageParams {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct UpdateUserParams {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct CreateSessionParams {
    pub user_id: Uuid,
    pub prefix: String,
    pub hashed_secret: Vec<u8>,
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContentCounts {
    pub projects: u64,
    pub blogs: u64,
    pub comments: u64,
    pub messages: u64,
    pub subscribers: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivityCounts {
    pub projects: u64,
    pub blogs: u64,
    pub messages: u64,
    pub subscribers: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogRef {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithBlog {
    #[serde(flatten)]
    pub comment: CommentRecord,
    pub blog: BlogRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: SkillCategory,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogCommentCount {
    pub id: Uuid,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub posted_date: OffsetDateTime,
    pub comment_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

#[async_trait]
pub trait ProjectsRepo: Send + Sync {
    /// All projects, newest first.
    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, RepoError>;

    async fn find_project(&self, id: Uuid) -> Result<Option<ProjectRecord>, RepoError>;

    async fn create_project(&self, params: CreateProjectParams)
    -> Result<ProjectRecord, RepoError>;

    async fn update_project(&self, params: UpdateProjectParams)
    -> Result<ProjectRecord, RepoError>;

    async fn delete_project(&self, id: Uuid) -> Result<(), RepoError>;

    /// Projects satisfying `predicate`, ordered by `created_at` descending.
    async fn search_projects(
        &self,
        predicate: &SearchPredicate,
    ) -> Result<Vec<ProjectRecord>, RepoError>;
}

#[async_trait]
pub trait BlogsRepo: Send + Sync {
    /// All posts with every comment and reaction, newest `posted_date` first.
    async fn list_blogs(&self) -> Result<Vec<BlogWithActivity>, RepoError>;

    async fn find_blog(&self, id: Uuid) -> Result<Option<BlogWithActivity>, RepoError>;

    async fn blog_exists(&self, id: Uuid) -> Result<bool, RepoError>;

    async fn create_blog(&self, params: CreateBlogParams) -> Result<BlogRecord, RepoError>;

    async fn update_blog(&self, params: UpdateBlogParams) -> Result<BlogRecord, RepoError>;

    /// Removes the post together with its comments and reactions.
    async fn delete_blog(&self, id: Uuid) -> Result<(), RepoError>;

    /// Posts satisfying `predicate`, ordered by `posted_date` descending, each carrying
    /// at most `comment_limit` of its newest comments and all of its reactions.
    async fn search_blogs(
        &self,
        predicate: &SearchPredicate,
        comment_limit: usize,
    ) -> Result<Vec<BlogWithActivity>, RepoError>;

    async fn list_comments(&self, blog_id: Uuid) -> Result<Vec<CommentRecord>, RepoError>;

    async fn create_comment(&self, params: CreateCommentParams)
    -> Result<CommentRecord, RepoError>;

    async fn list_reactions(&self, blog_id: Uuid) -> Result<Vec<ReactionRecord>, RepoError>;

    /// Inserts a reaction or replaces the one already left by the same e-mail on that post.
    async fn upsert_reaction(
        &self,
        params: UpsertReactionParams,
    ) -> Result<(ReactionRecord, ReactionOutcome), RepoError>;
}

#[async_trait]
pub trait SkillsRepo: Send + Sync {
    /// Ordered by category, then name.
    async fn list_skills(&self) -> Result<Vec<SkillRecord>, RepoError>;

    async fn find_skill(&self, id: Uuid) -> Result<Option<SkillRecord>, RepoError>;

    async fn create_skill(&self, params: SkillParams) -> Result<SkillRecord, RepoError>;

    async fn update_skill(&self, id: Uuid, params: SkillParams) -> Result<SkillRecord, RepoError>;

    async fn delete_skill(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait ServicesRepo: Send + Sync {
    async fn list_services(&self) -> Result<Vec<ServiceRecord>, RepoError>;

    async fn find_service(&self, id: Uuid) -> Result<Option<ServiceRecord>, RepoError>;

    async fn create_service(&self, params: ServiceParams) -> Result<ServiceRecord, RepoError>;

    async fn update_service(
        &self,
        id: Uuid,
        params: ServiceParams,
    ) -> Result<ServiceRecord, RepoError>;

    async fn delete_service(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait SubscribersRepo: Send + Sync {
    /// Fails with [`RepoError::Duplicate`] when the e-mail is already subscribed.
    async fn create_subscriber(
        &self,
        params: CreateSubscriberParams,
    ) -> Result<SubscriberRecord, RepoError>;

    /// Newest `subscribed_at` first.
    async fn list_subscribers(&self) -> Result<Vec<SubscriberRecord>, RepoError>;
}

#[async_trait]
pub trait MessagesRepo: Send + Sync {
    async fn create_message(&self, params: CreateMessageParams)
    -> Result<MessageRecord, RepoError>;

    /// Newest first; `limit` caps the result when present.
    async fn list_messages(&self, limit: Option<usize>) -> Result<Vec<MessageRecord>, RepoError>;
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;

    /// Fails with [`RepoError::Duplicate`] when the e-mail is taken.
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;

    async fn update_user(&self, params: UpdateUserParams) -> Result<UserRecord, RepoError>;
}

#[async_trait]
pub trait SessionsRepo: Send + Sync {
    async fn create_session(&self, params: CreateSessionParams)
    -> Result<SessionRecord, RepoError>;

    async fn find_session_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Option<SessionRecord>, RepoError>;

    /// Drops sessions with `expires_at <= now`; returns how many were removed.
    async fn delete_expired_sessions(&self, now: OffsetDateTime) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait DashboardRepo: Send + Sync {
    async fn content_counts(&self) -> Result<ContentCounts, RepoError>;

    async fn recent_comments(&self, limit: usize) -> Result<Vec<CommentWithBlog>, RepoError>;

    async fn skill_counts_by_category(&self) -> Result<Vec<CategoryCount>, RepoError>;

    /// Records created (subscribers: subscribed) at or after `since`.
    async fn activity_since(&self, since: OffsetDateTime) -> Result<ActivityCounts, RepoError>;

    /// Newest posts by `posted_date` with their comment totals.
    async fn blogs_with_comment_counts(
        &self,
        limit: usize,
    ) -> Result<Vec<BlogCommentCount>, RepoError>;

    /// How many posts carry each tag, unordered.
    async fn tag_usage(&self) -> Result<Vec<TagCount>, RepoError>;
}

/// Everything the HTTP layer needs from a storage adapter.
pub trait Repositories:
    ProjectsRepo
    + BlogsRepo
    + SkillsRepo
    + ServicesRepo
    + SubscribersRepo
    + MessagesRepo
    + UsersRepo
    + SessionsRepo
    + DashboardRepo
    + 'static
{
}

impl<T> Repositories for T where
    T: ProjectsRepo
        + BlogsRepo
        + SkillsRepo
        + ServicesRepo
        + SubscribersRepo
        + MessagesRepo
        + UsersRepo
        + SessionsRepo
        + DashboardRepo
        + 'static
{
}
