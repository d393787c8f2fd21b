//! Project handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use super::{ApiJson, ApiPath, content_to_api};
use crate::infra::http::api::auth::AdminUser;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{MessageResponse, ProjectRequest};
use crate::infra::http::api::state::ApiState;

pub async fn list_projects(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let projects = state.projects.list().await.map_err(content_to_api)?;
    Ok(Json(projects))
}

pub async fn get_project(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state.projects.get(id).await.map_err(content_to_api)?;
    Ok(Json(project))
}

pub async fn create_project(
    State(state): State<ApiState>,
    _admin: AdminUser,
    ApiJson(payload): ApiJson<ProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state
        .projects
        .create(payload.into())
        .await
        .map_err(content_to_api)?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn update_project(
    State(state): State<ApiState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state
        .projects
        .update(id, payload.into())
        .await
        .map_err(content_to_api)?;
    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<ApiState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.projects.delete(id).await.map_err(content_to_api)?;
    Ok(Json(MessageResponse::new("Project removed")))
}
