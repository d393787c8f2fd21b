//! Account handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::{ApiJson, user_to_api};
use crate::infra::http::api::auth::AuthUser;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{LoginRequest, ProfileUpdateRequest, RegisterRequest};
use crate::infra::http::api::state::ApiState;

pub async fn register_user(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .users
        .register(payload.into())
        .await
        .map_err(user_to_api)?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login_user(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .users
        .login(payload.into())
        .await
        .map_err(user_to_api)?;
    Ok(Json(session))
}

pub async fn get_profile(
    State(state): State<ApiState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.users.profile(user.id).await.map_err(user_to_api)?;
    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<ApiState>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<ProfileUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .users
        .update_profile(user.id, payload.into())
        .await
        .map_err(user_to_api)?;
    Ok(Json(session))
}
