use std::error::Error as StdError;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::ErrorReport;
use crate::domain::validation::{FieldError, FieldErrors};

const SOURCE: &str = "infra::http::api";
const SERVER_ERROR: &str = "Server error";

/// Body shapes returned to clients: a single message, or one entry per failing field.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiErrorBody {
    Message { message: String },
    Fields { errors: Vec<FieldError> },
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, hint: Option<String>) -> Self {
        let message = message.into();
        let detail = hint.unwrap_or_else(|| message.clone());
        Self {
            status,
            body: ApiErrorBody::Message { message },
            report: ErrorReport::from_message(SOURCE, status, detail),
        }
    }

    pub fn bad_request(message: impl Into<String>, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, hint)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message, None)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message, None)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, None)
    }

    pub fn validation(errors: FieldErrors) -> Self {
        let status = StatusCode::BAD_REQUEST;
        Self {
            status,
            report: ErrorReport::from_message(SOURCE, status, format!("validation: {errors}")),
            body: ApiErrorBody::Fields {
                errors: errors.into_vec(),
            },
        }
    }

    /// Generic 500 for clients; the cause chain only goes to the log.
    pub fn internal(source: &'static str, error: &dyn StdError) -> Self {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        Self {
            status,
            body: ApiErrorBody::Message {
                message: SERVER_ERROR.to_string(),
            },
            report: ErrorReport::from_error(source, status, error),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Invalid request body", Some(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        self.report.attach(&mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        (status, serde_json::from_slice(&bytes).expect("json"))
    }

    #[tokio::test]
    async fn field_errors_render_as_list() {
        let mut errors = FieldErrors::new();
        errors.push("title", "Title is required");
        let (status, body) = body_json(ApiError::validation(errors)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({"errors": [{"field": "title", "message": "Title is required"}]})
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_the_cause() {
        let cause = std::io::Error::other("connection reset");
        let error = ApiError::internal("test", &cause);
        let response = error.into_response();
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .cloned()
            .expect("report");
        assert!(report.messages.iter().any(|m| m.contains("connection reset")));

        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body, serde_json::json!({"message": "Server error"}));
    }
}
