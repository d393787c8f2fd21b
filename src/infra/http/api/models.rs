//! Request and response bodies for the REST API.
//!
//! Request fields are optional at the serde level so that missing values
//! surface as field-level validation errors instead of a rejected body.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::application::blogs::{BlogInput, CommentInput, ReactionInput};
use crate::application::messages::MessageInput;
use crate::application::projects::ProjectInput;
use crate::application::search::{SearchCriteria, SearchHits, Suggestion};
use crate::application::services::ServiceInput;
use crate::application::skills::SkillInput;
use crate::application::subscribers::SubscribeInput;
use crate::application::users::{LoginCommand, RegisterCommand, UpdateProfileCommand};
use crate::domain::entities::{BlogWithActivity, ProjectRecord};

/// A list given either as a JSON array or as one comma-separated string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawStringList")]
pub struct StringList(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStringList {
    Many(Vec<String>),
    Joined(String),
}

impl From<RawStringList> for StringList {
    fn from(raw: RawStringList) -> Self {
        match raw {
            RawStringList::Many(items) => Self(items),
            RawStringList::Joined(joined) => {
                Self(joined.split(',').map(|item| item.to_string()).collect())
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<StringList>,
    pub github_link: Option<String>,
    pub live_link: Option<String>,
    pub image_url: Option<String>,
}

impl From<ProjectRequest> for ProjectInput {
    fn from(request: ProjectRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            tech_stack: request.tech_stack.map(|list| list.0),
            github_link: request.github_link,
            live_link: request.live_link,
            image_url: request.image_url,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlogRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<StringList>,
}

impl From<BlogRequest> for BlogInput {
    fn from(request: BlogRequest) -> Self {
        Self {
            title: request.title,
            content: request.content,
            cover_image: request.cover_image,
            tags: request.tags.map(|list| list.0),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub comment: Option<String>,
}

impl From<CommentRequest> for CommentInput {
    fn from(request: CommentRequest) -> Self {
        Self {
            name: request.name.unwrap_or_default(),
            email: request.email.unwrap_or_default(),
            comment: request.comment.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReactionRequest {
    pub user_email: Option<String>,
    pub reaction: Option<String>,
}

impl From<ReactionRequest> for ReactionInput {
    fn from(request: ReactionRequest) -> Self {
        Self {
            user_email: request.user_email.unwrap_or_default(),
            reaction: request.reaction.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SkillRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub percentage: Option<Value>,
}

impl From<SkillRequest> for SkillInput {
    fn from(request: SkillRequest) -> Self {
        Self {
            name: request.name,
            category: request.category,
            percentage: request.percentage,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServiceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl From<ServiceRequest> for ServiceInput {
    fn from(request: ServiceRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            icon: request.icon,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubscribeRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

impl From<SubscribeRequest> for SubscribeInput {
    fn from(request: SubscribeRequest) -> Self {
        Self {
            email: request.email.unwrap_or_default(),
            name: request.name,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MessageRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl From<MessageRequest> for MessageInput {
    fn from(request: MessageRequest) -> Self {
        Self {
            name: request.name.unwrap_or_default(),
            email: request.email.unwrap_or_default(),
            subject: request.subject.unwrap_or_default(),
            message: request.message.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<RegisterRequest> for RegisterCommand {
    fn from(request: RegisterRequest) -> Self {
        Self {
            name: request.name.unwrap_or_default(),
            email: request.email.unwrap_or_default(),
            password: request.password.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<LoginRequest> for LoginCommand {
    fn from(request: LoginRequest) -> Self {
        Self {
            email: request.email.unwrap_or_default(),
            password: request.password.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<ProfileUpdateRequest> for UpdateProfileCommand {
    fn from(request: ProfileUpdateRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            password: request.password,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClearCacheRequest {
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_path: String,
}

/// Search results; a domain outside the request's scope is omitted entirely.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<ProjectRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blogs: Option<Vec<BlogWithActivity>>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<AppliedFilters>,
}

impl SearchResponse {
    pub fn all(hits: SearchHits) -> Self {
        let total = hits.total();
        Self {
            projects: Some(hits.projects),
            blogs: Some(hits.blogs),
            total,
            filters: None,
        }
    }

    pub fn projects(hits: SearchHits) -> Self {
        Self {
            total: hits.projects.len(),
            projects: Some(hits.projects),
            blogs: None,
            filters: None,
        }
    }

    pub fn blogs(hits: SearchHits) -> Self {
        Self {
            total: hits.blogs.len(),
            projects: None,
            blogs: Some(hits.blogs),
            filters: None,
        }
    }

    pub fn with_filters(mut self, filters: AppliedFilters) -> Self {
        self.filters = Some(filters);
        self
    }
}

/// Echo of the parsed filters of an advanced search.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AppliedFilters {
    #[serde(rename_all = "camelCase")]
    Projects { query: String, tech_stack: Vec<String> },
    #[serde(rename_all = "camelCase")]
    Blogs {
        query: String,
        tags: Vec<String>,
        #[serde(with = "time::serde::rfc3339::option")]
        date_from: Option<OffsetDateTime>,
        #[serde(with = "time::serde::rfc3339::option")]
        date_to: Option<OffsetDateTime>,
    },
}

impl AppliedFilters {
    pub fn projects(criteria: &SearchCriteria) -> Self {
        Self::Projects {
            query: criteria.free_text.clone(),
            tech_stack: criteria.tag_filter.clone(),
        }
    }

    pub fn blogs(criteria: &SearchCriteria) -> Self {
        Self::Blogs {
            query: criteria.free_text.clone(),
            tags: criteria.tag_filter.clone(),
            date_from: criteria.date_range.from,
            date_to: criteria.date_range.to,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularTermsResponse {
    pub popular_terms: &'static [&'static str],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_list_accepts_array_or_comma_string() {
        let from_array: ProjectRequest =
            serde_json::from_str(r#"{"techStack": ["Rust", "Axum"]}"#).expect("array");
        assert_eq!(
            from_array.tech_stack,
            Some(StringList(vec!["Rust".into(), "Axum".into()]))
        );

        let from_string: BlogRequest =
            serde_json::from_str(r#"{"tags": "rust, web"}"#).expect("string");
        assert_eq!(
            from_string.tags,
            Some(StringList(vec!["rust".into(), " web".into()]))
        );
    }

    #[test]
    fn blog_filters_echo_open_dates_as_null() {
        let criteria = SearchCriteria::text("rust");
        let value = serde_json::to_value(AppliedFilters::blogs(&criteria)).expect("json");
        assert_eq!(
            value,
            serde_json::json!({"query": "rust", "tags": [], "dateFrom": null, "dateTo": null})
        );
    }

    #[test]
    fn scoped_search_omits_the_other_domain() {
        let value = serde_json::to_value(SearchResponse::projects(SearchHits::default()))
            .expect("json");
        assert_eq!(value, serde_json::json!({"projects": [], "total": 0}));
    }

    #[test]
    fn missing_fields_become_empty_commands() {
        let request: MessageRequest = serde_json::from_str("{}").expect("empty body");
        let input = MessageInput::from(request);
        assert!(input.name.is_empty());
        assert!(input.email.is_empty());
    }
}
