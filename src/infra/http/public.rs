//! Routes outside the JSON API: the welcome banner, stored uploads and the 404 fallback.

use std::io::ErrorKind;

use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{
        HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::error;

use crate::infra::uploads::UploadStorageError;

use super::api::error::ApiError;
use super::api::models::MessageResponse;
use super::api::state::ApiState;

pub async fn welcome() -> impl IntoResponse {
    Json(MessageResponse::new("Welcome to Portfolio API"))
}

pub async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

pub async fn serve_upload(State(state): State<ApiState>, Path(path): Path<String>) -> Response {
    const SOURCE: &str = "infra::http::public::serve_upload";

    match state.upload_storage.read(&path).await {
        Ok(bytes) => build_upload_response(&path, bytes),
        Err(UploadStorageError::InvalidPath) => {
            ApiError::not_found("Upload not found").into_response()
        }
        Err(UploadStorageError::Io(err))
            if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) =>
        {
            ApiError::not_found("Upload not found").into_response()
        }
        Err(err) => {
            error!(
                target = SOURCE,
                path = %path,
                error = %err,
                "failed to read stored upload"
            );
            ApiError::internal(SOURCE, &err).into_response()
        }
    }
}

fn build_upload_response(path: &str, bytes: Bytes) -> Response {
    let length = bytes.len();
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&length.to_string()) {
        headers.insert(CONTENT_LENGTH, value);
    }
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=86400"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_guesses_content_type() {
        let response = build_upload_response("blogs/blog-1-abc.png", Bytes::from_static(b"png"));
        assert_eq!(
            response.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("image/png"))
        );
        assert_eq!(
            response.headers().get(CONTENT_LENGTH),
            Some(&HeaderValue::from_static("3"))
        );
    }
}
