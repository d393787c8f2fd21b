use std::error::Error as StdError;

use axum::{http::StatusCode, response::Response};
use thiserror::Error;

use crate::{
    application::repos::RepoError,
    domain::{error::DomainError, validation::FieldErrors},
    infra::error::InfraError,
};

/// Diagnostic detail carried on error responses and logged by the response middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Failure of a content service (projects, blogs, skills, services, subscribers, messages).
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("{0}")]
    Conflict(&'static str),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl ContentError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    /// Maps a repository `NotFound` onto the named entity; other failures pass through.
    pub fn from_repo(entity: &'static str, err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::not_found(entity),
            other => Self::Repo(other),
        }
    }
}

impl From<FieldErrors> for ContentError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Process-level failure surfaced by `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_walks_the_source_chain() {
        let error = AppError::from(InfraError::Io(std::io::Error::other("disk full")));
        let report = ErrorReport::from_error("test", StatusCode::INTERNAL_SERVER_ERROR, &error);

        assert_eq!(report.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(report.messages.iter().any(|m| m.contains("disk full")));
    }

    #[test]
    fn content_not_found_names_the_entity() {
        assert_eq!(
            ContentError::not_found("Project").to_string(),
            "Project not found"
        );
    }
}
