//! Skill handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use super::{ApiJson, ApiPath, content_to_api};
use crate::infra::http::api::auth::AdminUser;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{MessageResponse, SkillRequest};
use crate::infra::http::api::state::ApiState;

pub async fn list_skills(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let skills = state.skills.list().await.map_err(content_to_api)?;
    Ok(Json(skills))
}

pub async fn create_skill(
    State(state): State<ApiState>,
    _admin: AdminUser,
    ApiJson(payload): ApiJson<SkillRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let skill = state
        .skills
        .create(payload.into())
        .await
        .map_err(content_to_api)?;
    Ok((StatusCode::CREATED, Json(skill)))
}

pub async fn update_skill(
    State(state): State<ApiState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<SkillRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let skill = state
        .skills
        .update(id, payload.into())
        .await
        .map_err(content_to_api)?;
    Ok(Json(skill))
}

pub async fn delete_skill(
    State(state): State<ApiState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.skills.delete(id).await.map_err(content_to_api)?;
    Ok(Json(MessageResponse::new("Skill removed")))
}
