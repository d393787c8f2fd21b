//! Image upload handlers

use axum::Json;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use futures::TryStreamExt;
use tracing::info;

use crate::infra::http::api::auth::AdminUser;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::UploadResponse;
use crate::infra::http::api::state::ApiState;
use crate::infra::uploads::{UploadKind, UploadStorageError, is_image};

const IMAGE_FIELD: &str = "image";
const NO_FILE: &str = "No file uploaded";
const UPLOAD_FAILED: &str = "Error uploading file";

pub async fn upload_project_image(
    State(state): State<ApiState>,
    AdminUser(admin): AdminUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    store_image(&state, UploadKind::Project, &admin.email, multipart).await
}

pub async fn upload_blog_image(
    State(state): State<ApiState>,
    AdminUser(admin): AdminUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    store_image(&state, UploadKind::Blog, &admin.email, multipart).await
}

async fn store_image(
    state: &ApiState,
    kind: UploadKind,
    actor: &str,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(UPLOAD_FAILED, Some(err.to_string())))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        if !is_image(field.content_type()) {
            return Err(ApiError::bad_request(
                UPLOAD_FAILED,
                Some(format!(
                    "unsupported content type `{}`",
                    field.content_type().unwrap_or("none")
                )),
            ));
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let stream = field.map_err(|err| UploadStorageError::PayloadStream {
            source: Box::new(err),
        });
        let stored = state
            .upload_storage
            .store_stream(kind, &original_name, stream)
            .await
            .map_err(upload_storage_to_api)?;

        info!(
            target = "portfolio::uploads",
            actor = actor,
            path = %stored.stored_path,
            size_bytes = stored.size_bytes,
            "image stored"
        );
        return Ok(Json(UploadResponse {
            file_path: stored.public_path(),
        }));
    }

    Err(ApiError::bad_request(NO_FILE, None))
}

fn upload_storage_to_api(err: UploadStorageError) -> ApiError {
    match err {
        UploadStorageError::EmptyPayload => ApiError::bad_request(NO_FILE, None),
        other => ApiError::bad_request(UPLOAD_FAILED, Some(other.to_string())),
    }
}
