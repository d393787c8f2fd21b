//! API handlers organized by resource type.
//!
//! Error conversions shared across modules live here.

mod admin;
mod blogs;
mod contact;
mod projects;
mod search;
mod services;
mod skills;
mod uploads;
mod users;

pub use admin::*;
pub use blogs::*;
pub use contact::*;
pub use projects::*;
pub use search::*;
pub use services::*;
pub use skills::*;
pub use uploads::*;
pub use users::*;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, OptionalFromRequest, Request};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;

use crate::application::error::ContentError;
use crate::application::repos::RepoError;
use crate::application::search::CriteriaError;
use crate::application::users::{AuthError, UserError};

use super::error::ApiError;

/// JSON body whose rejections render as API errors.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// An empty or whitespace-only body extracts as `None`.
impl<T, S> OptionalFromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let bytes = <Bytes as FromRequest<S>>::from_request(req, state)
            .await
            .map_err(|err| ApiError::bad_request("Invalid request body", Some(err.body_text())))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let Json(value) = Json::<T>::from_bytes(&bytes)?;
        Ok(Some(ApiJson(value)))
    }
}

/// Path parameters whose rejections render as API errors.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query-string parameters whose rejections render as API errors.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request("Invalid query string", Some(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request("Invalid id", Some(rejection.body_text()))
    }
}

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::NotFound => ApiError::not_found("Resource not found"),
        RepoError::Duplicate { constraint } => {
            ApiError::bad_request("Duplicate record", Some(constraint))
        }
        RepoError::InvalidInput { message } | RepoError::Integrity { message } => {
            ApiError::bad_request("Invalid input", Some(message))
        }
        other @ (RepoError::Persistence(_) | RepoError::Timeout) => {
            ApiError::internal("application::repos", &other)
        }
    }
}

pub(crate) fn content_to_api(err: ContentError) -> ApiError {
    match err {
        ContentError::Validation(errors) => ApiError::validation(errors),
        ContentError::NotFound { entity } => ApiError::not_found(format!("{entity} not found")),
        ContentError::Conflict(message) => ApiError::bad_request(message, None),
        ContentError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn user_to_api(err: UserError) -> ApiError {
    match err {
        UserError::Validation(errors) => ApiError::validation(errors),
        UserError::AlreadyExists => ApiError::bad_request(err.to_string(), None),
        UserError::InvalidCredentials => ApiError::unauthorized(err.to_string()),
        UserError::NotFound => ApiError::not_found(err.to_string()),
        UserError::Password(source) => ApiError::internal("application::users", &source),
        UserError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn auth_to_api(err: AuthError) -> ApiError {
    match err {
        AuthError::Missing | AuthError::Invalid | AuthError::UserNotFound => {
            ApiError::unauthorized(err.to_string())
        }
        AuthError::Forbidden => ApiError::forbidden(err.to_string()),
        AuthError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn criteria_to_api(err: CriteriaError) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, err.to_string(), None)
}
