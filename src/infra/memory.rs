//! Process-local storage adapter.
//!
//! Implements every repository trait over plain vectors guarded by one lock.
//! Used by the `memory` storage backend and throughout the test suite.

use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::repos::{
    ActivityCounts, BlogCommentCount, BlogRef, BlogsRepo, CategoryCount, CommentWithBlog,
    ContentCounts, CreateBlogParams, CreateCommentParams, CreateMessageParams,
    CreateProjectParams, CreateSessionParams, CreateSubscriberParams, CreateUserParams,
    DashboardRepo, MessagesRepo, ProjectsRepo, RepoError, ServiceParams, ServicesRepo,
    SessionsRepo, SkillParams, SkillsRepo, SubscribersRepo, TagCount, UpdateBlogParams,
    UpdateProjectParams, UpdateUserParams, UpsertReactionParams, UsersRepo,
};
use crate::application::search::SearchPredicate;
use crate::domain::entities::{
    BlogRecord, BlogWithActivity, CommentRecord, MessageRecord, ProjectRecord, ReactionRecord,
    ServiceRecord, SessionRecord, SkillRecord, SubscriberRecord, UserRecord,
};
use crate::domain::types::ReactionOutcome;

#[derive(Default)]
struct State {
    projects: Vec<ProjectRecord>,
    blogs: Vec<BlogRecord>,
    comments: Vec<CommentRecord>,
    reactions: Vec<ReactionRecord>,
    skills: Vec<SkillRecord>,
    services: Vec<ServiceRecord>,
    subscribers: Vec<SubscriberRecord>,
    messages: Vec<MessageRecord>,
    users: Vec<UserRecord>,
    sessions: Vec<SessionRecord>,
}

impl State {
    fn activity(&self, blog: &BlogRecord, comment_limit: Option<usize>) -> BlogWithActivity {
        let mut comments =
            newest_first(self.comments.iter().filter(|c| c.blog_id == blog.id), |c| {
                c.created_at
            });
        if let Some(limit) = comment_limit {
            comments.truncate(limit);
        }
        let reactions = self
            .reactions
            .iter()
            .filter(|r| r.blog_id == blog.id)
            .cloned()
            .collect();

        BlogWithActivity {
            blog: blog.clone(),
            comments,
            reactions,
        }
    }
}

/// Clones `items` ordered by `key` descending. Ties put the most recently
/// inserted record first.
fn newest_first<'a, T, I, F>(items: I, key: F) -> Vec<T>
where
    T: Clone + 'a,
    I: DoubleEndedIterator<Item = &'a T>,
    F: Fn(&T) -> OffsetDateTime,
{
    let mut out: Vec<T> = items.rev().cloned().collect();
    out.sort_by_key(|item| std::cmp::Reverse(key(item)));
    out
}

fn count_since(stamps: impl Iterator<Item = OffsetDateTime>, since: OffsetDateTime) -> u64 {
    stamps.filter(|stamp| *stamp >= since).count() as u64
}

fn duplicate(constraint: &str) -> RepoError {
    RepoError::Duplicate {
        constraint: constraint.to_string(),
    }
}

#[derive(Default)]
pub struct InMemoryRepositories {
    state: RwLock<State>,
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectsRepo for InMemoryRepositories {
    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, RepoError> {
        let state = self.state.read().await;
        Ok(newest_first(state.projects.iter(), |p| p.created_at))
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<ProjectRecord>, RepoError> {
        let state = self.state.read().await;
        Ok(state.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn create_project(
        &self,
        params: CreateProjectParams,
    ) -> Result<ProjectRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let record = ProjectRecord {
            id: Uuid::new_v4(),
            title: params.title,
            description: params.description,
            tech_stack: params.tech_stack,
            github_link: params.github_link,
            live_link: params.live_link,
            image_url: params.image_url,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.projects.push(record.clone());
        Ok(record)
    }

    async fn update_project(
        &self,
        params: UpdateProjectParams,
    ) -> Result<ProjectRecord, RepoError> {
        let mut state = self.state.write().await;
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.id == params.id)
            .ok_or(RepoError::NotFound)?;
        project.title = params.title;
        project.description = params.description;
        project.tech_stack = params.tech_stack;
        project.github_link = params.github_link;
        project.live_link = params.live_link;
        project.image_url = params.image_url;
        project.updated_at = OffsetDateTime::now_utc();
        Ok(project.clone())
    }

    async fn delete_project(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let before = state.projects.len();
        state.projects.retain(|p| p.id != id);
        if state.projects.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn search_projects(
        &self,
        predicate: &SearchPredicate,
    ) -> Result<Vec<ProjectRecord>, RepoError> {
        let state = self.state.read().await;
        Ok(newest_first(
            state.projects.iter().filter(|p| predicate.matches(*p)),
            |p| p.created_at,
        ))
    }
}

#[async_trait]
impl BlogsRepo for InMemoryRepositories {
    async fn list_blogs(&self) -> Result<Vec<BlogWithActivity>, RepoError> {
        let state = self.state.read().await;
        Ok(newest_first(state.blogs.iter(), |b| b.posted_date)
            .iter()
            .map(|blog| state.activity(blog, None))
            .collect())
    }

    async fn find_blog(&self, id: Uuid) -> Result<Option<BlogWithActivity>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .blogs
            .iter()
            .find(|b| b.id == id)
            .map(|blog| state.activity(blog, None)))
    }

    async fn blog_exists(&self, id: Uuid) -> Result<bool, RepoError> {
        let state = self.state.read().await;
        Ok(state.blogs.iter().any(|b| b.id == id))
    }

    async fn create_blog(&self, params: CreateBlogParams) -> Result<BlogRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let record = BlogRecord {
            id: Uuid::new_v4(),
            title: params.title,
            content: params.content,
            cover_image: params.cover_image,
            posted_date: params.posted_date,
            tags: params.tags,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.blogs.push(record.clone());
        Ok(record)
    }

    async fn update_blog(&self, params: UpdateBlogParams) -> Result<BlogRecord, RepoError> {
        let mut state = self.state.write().await;
        let blog = state
            .blogs
            .iter_mut()
            .find(|b| b.id == params.id)
            .ok_or(RepoError::NotFound)?;
        blog.title = params.title;
        blog.content = params.content;
        blog.cover_image = params.cover_image;
        blog.tags = params.tags;
        blog.updated_at = OffsetDateTime::now_utc();
        Ok(blog.clone())
    }

    async fn delete_blog(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let before = state.blogs.len();
        state.blogs.retain(|b| b.id != id);
        if state.blogs.len() == before {
            return Err(RepoError::NotFound);
        }
        state.comments.retain(|c| c.blog_id != id);
        state.reactions.retain(|r| r.blog_id != id);
        Ok(())
    }

    async fn search_blogs(
        &self,
        predicate: &SearchPredicate,
        comment_limit: usize,
    ) -> Result<Vec<BlogWithActivity>, RepoError> {
        let state = self.state.read().await;
        Ok(newest_first(
            state.blogs.iter().filter(|b| predicate.matches(*b)),
            |b| b.posted_date,
        )
        .iter()
        .map(|blog| state.activity(blog, Some(comment_limit)))
        .collect())
    }

    async fn list_comments(&self, blog_id: Uuid) -> Result<Vec<CommentRecord>, RepoError> {
        let state = self.state.read().await;
        Ok(newest_first(
            state.comments.iter().filter(|c| c.blog_id == blog_id),
            |c| c.created_at,
        ))
    }

    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let mut state = self.state.write().await;
        if !state.blogs.iter().any(|b| b.id == params.blog_id) {
            return Err(RepoError::NotFound);
        }
        let record = CommentRecord {
            id: Uuid::new_v4(),
            blog_id: params.blog_id,
            name: params.name,
            email: params.email,
            comment: params.comment,
            created_at: OffsetDateTime::now_utc(),
        };
        state.comments.push(record.clone());
        Ok(record)
    }

    async fn list_reactions(&self, blog_id: Uuid) -> Result<Vec<ReactionRecord>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .reactions
            .iter()
            .filter(|r| r.blog_id == blog_id)
            .cloned()
            .collect())
    }

    async fn upsert_reaction(
        &self,
        params: UpsertReactionParams,
    ) -> Result<(ReactionRecord, ReactionOutcome), RepoError> {
        let mut state = self.state.write().await;
        if !state.blogs.iter().any(|b| b.id == params.blog_id) {
            return Err(RepoError::NotFound);
        }
        let now = OffsetDateTime::now_utc();
        if let Some(existing) = state
            .reactions
            .iter_mut()
            .find(|r| r.blog_id == params.blog_id && r.user_email == params.user_email)
        {
            existing.reaction = params.reaction;
            existing.updated_at = now;
            return Ok((existing.clone(), ReactionOutcome::Updated));
        }

        let record = ReactionRecord {
            id: Uuid::new_v4(),
            blog_id: params.blog_id,
            user_email: params.user_email,
            reaction: params.reaction,
            created_at: now,
            updated_at: now,
        };
        state.reactions.push(record.clone());
        Ok((record, ReactionOutcome::Created))
    }
}

#[async_trait]
impl SkillsRepo for InMemoryRepositories {
    async fn list_skills(&self) -> Result<Vec<SkillRecord>, RepoError> {
        let state = self.state.read().await;
        let mut skills = state.skills.clone();
        skills.sort_by(|a, b| {
            a.category
                .as_str()
                .cmp(b.category.as_str())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(skills)
    }

    async fn find_skill(&self, id: Uuid) -> Result<Option<SkillRecord>, RepoError> {
        let state = self.state.read().await;
        Ok(state.skills.iter().find(|s| s.id == id).cloned())
    }

    async fn create_skill(&self, params: SkillParams) -> Result<SkillRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let record = SkillRecord {
            id: Uuid::new_v4(),
            name: params.name,
            category: params.category,
            percentage: params.percentage,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.skills.push(record.clone());
        Ok(record)
    }

    async fn update_skill(&self, id: Uuid, params: SkillParams) -> Result<SkillRecord, RepoError> {
        let mut state = self.state.write().await;
        let skill = state
            .skills
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RepoError::NotFound)?;
        skill.name = params.name;
        skill.category = params.category;
        skill.percentage = params.percentage;
        skill.updated_at = OffsetDateTime::now_utc();
        Ok(skill.clone())
    }

    async fn delete_skill(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let before = state.skills.len();
        state.skills.retain(|s| s.id != id);
        if state.skills.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ServicesRepo for InMemoryRepositories {
    async fn list_services(&self) -> Result<Vec<ServiceRecord>, RepoError> {
        Ok(self.state.read().await.services.clone())
    }

    async fn find_service(&self, id: Uuid) -> Result<Option<ServiceRecord>, RepoError> {
        let state = self.state.read().await;
        Ok(state.services.iter().find(|s| s.id == id).cloned())
    }

    async fn create_service(&self, params: ServiceParams) -> Result<ServiceRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let record = ServiceRecord {
            id: Uuid::new_v4(),
            title: params.title,
            description: params.description,
            icon: params.icon,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.services.push(record.clone());
        Ok(record)
    }

    async fn update_service(
        &self,
        id: Uuid,
        params: ServiceParams,
    ) -> Result<ServiceRecord, RepoError> {
        let mut state = self.state.write().await;
        let service = state
            .services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RepoError::NotFound)?;
        service.title = params.title;
        service.description = params.description;
        service.icon = params.icon;
        service.updated_at = OffsetDateTime::now_utc();
        Ok(service.clone())
    }

    async fn delete_service(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let before = state.services.len();
        state.services.retain(|s| s.id != id);
        if state.services.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl SubscribersRepo for InMemoryRepositories {
    async fn create_subscriber(
        &self,
        params: CreateSubscriberParams,
    ) -> Result<SubscriberRecord, RepoError> {
        let mut state = self.state.write().await;
        if state.subscribers.iter().any(|s| s.email == params.email) {
            return Err(duplicate("subscribers_email_key"));
        }
        let now = OffsetDateTime::now_utc();
        let record = SubscriberRecord {
            id: Uuid::new_v4(),
            email: params.email,
            name: params.name,
            subscribed_at: now,
            created_at: now,
        };
        state.subscribers.push(record.clone());
        Ok(record)
    }

    async fn list_subscribers(&self) -> Result<Vec<SubscriberRecord>, RepoError> {
        let state = self.state.read().await;
        Ok(newest_first(state.subscribers.iter(), |s| s.subscribed_at))
    }
}

#[async_trait]
impl MessagesRepo for InMemoryRepositories {
    async fn create_message(
        &self,
        params: CreateMessageParams,
    ) -> Result<MessageRecord, RepoError> {
        let record = MessageRecord {
            id: Uuid::new_v4(),
            name: params.name,
            email: params.email,
            subject: params.subject,
            message: params.message,
            created_at: OffsetDateTime::now_utc(),
        };
        self.state.write().await.messages.push(record.clone());
        Ok(record)
    }

    async fn list_messages(&self, limit: Option<usize>) -> Result<Vec<MessageRecord>, RepoError> {
        let state = self.state.read().await;
        let mut messages = newest_first(state.messages.iter(), |m| m.created_at);
        if let Some(limit) = limit {
            messages.truncate(limit);
        }
        Ok(messages)
    }
}

#[async_trait]
impl UsersRepo for InMemoryRepositories {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == params.email) {
            return Err(duplicate("users_email_key"));
        }
        let now = OffsetDateTime::now_utc();
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: params.name,
            email: params.email,
            password_hash: params.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.users.push(record.clone());
        Ok(record)
    }

    async fn update_user(&self, params: UpdateUserParams) -> Result<UserRecord, RepoError> {
        let mut state = self.state.write().await;
        if state
            .users
            .iter()
            .any(|u| u.email == params.email && u.id != params.id)
        {
            return Err(duplicate("users_email_key"));
        }
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == params.id)
            .ok_or(RepoError::NotFound)?;
        user.name = params.name;
        user.email = params.email;
        user.password_hash = params.password_hash;
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }
}

#[async_trait]
impl SessionsRepo for InMemoryRepositories {
    async fn create_session(
        &self,
        params: CreateSessionParams,
    ) -> Result<SessionRecord, RepoError> {
        let mut state = self.state.write().await;
        if state.sessions.iter().any(|s| s.prefix == params.prefix) {
            return Err(duplicate("sessions_prefix_key"));
        }
        let record = SessionRecord {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            prefix: params.prefix,
            hashed_secret: params.hashed_secret,
            expires_at: params.expires_at,
            created_at: OffsetDateTime::now_utc(),
        };
        state.sessions.push(record.clone());
        Ok(record)
    }

    async fn find_session_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Option<SessionRecord>, RepoError> {
        let state = self.state.read().await;
        Ok(state.sessions.iter().find(|s| s.prefix == prefix).cloned())
    }

    async fn delete_expired_sessions(&self, now: OffsetDateTime) -> Result<u64, RepoError> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|s| s.expires_at > now);
        Ok((before - state.sessions.len()) as u64)
    }
}

#[async_trait]
impl DashboardRepo for InMemoryRepositories {
    async fn content_counts(&self) -> Result<ContentCounts, RepoError> {
        let state = self.state.read().await;
        Ok(ContentCounts {
            projects: state.projects.len() as u64,
            blogs: state.blogs.len() as u64,
            comments: state.comments.len() as u64,
            messages: state.messages.len() as u64,
            subscribers: state.subscribers.len() as u64,
        })
    }

    async fn recent_comments(&self, limit: usize) -> Result<Vec<CommentWithBlog>, RepoError> {
        let state = self.state.read().await;
        Ok(newest_first(state.comments.iter(), |c| c.created_at)
            .into_iter()
            .filter_map(|comment| {
                let blog = state.blogs.iter().find(|b| b.id == comment.blog_id)?;
                Some(CommentWithBlog {
                    blog: BlogRef {
                        id: blog.id,
                        title: blog.title.clone(),
                    },
                    comment,
                })
            })
            .take(limit)
            .collect())
    }

    async fn skill_counts_by_category(&self) -> Result<Vec<CategoryCount>, RepoError> {
        let state = self.state.read().await;
        let mut counts = BTreeMap::new();
        for skill in &state.skills {
            *counts.entry(skill.category).or_insert(0u64) += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect())
    }

    async fn activity_since(&self, since: OffsetDateTime) -> Result<ActivityCounts, RepoError> {
        let state = self.state.read().await;
        Ok(ActivityCounts {
            projects: count_since(state.projects.iter().map(|p| p.created_at), since),
            blogs: count_since(state.blogs.iter().map(|b| b.created_at), since),
            messages: count_since(state.messages.iter().map(|m| m.created_at), since),
            subscribers: count_since(state.subscribers.iter().map(|s| s.subscribed_at), since),
        })
    }

    async fn blogs_with_comment_counts(
        &self,
        limit: usize,
    ) -> Result<Vec<BlogCommentCount>, RepoError> {
        let state = self.state.read().await;
        let mut blogs = newest_first(state.blogs.iter(), |b| b.posted_date);
        blogs.truncate(limit);
        Ok(blogs
            .into_iter()
            .map(|blog| BlogCommentCount {
                comment_count: state
                    .comments
                    .iter()
                    .filter(|c| c.blog_id == blog.id)
                    .count() as u64,
                id: blog.id,
                title: blog.title,
                posted_date: blog.posted_date,
            })
            .collect())
    }

    async fn tag_usage(&self) -> Result<Vec<TagCount>, RepoError> {
        let state = self.state.read().await;
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for blog in &state.blogs {
            for tag in &blog.tags {
                *counts.entry(tag.as_str()).or_default() += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|(tag, count)| TagCount {
                tag: tag.to_string(),
                count,
            })
            .collect())
    }
}
