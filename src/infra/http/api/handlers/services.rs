//! Offered-service handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use super::{ApiJson, ApiPath, content_to_api};
use crate::infra::http::api::auth::AdminUser;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{MessageResponse, ServiceRequest};
use crate::infra::http::api::state::ApiState;

pub async fn list_services(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let services = state.services.list().await.map_err(content_to_api)?;
    Ok(Json(services))
}

pub async fn create_service(
    State(state): State<ApiState>,
    _admin: AdminUser,
    ApiJson(payload): ApiJson<ServiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state
        .services
        .create(payload.into())
        .await
        .map_err(content_to_api)?;
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn update_service(
    State(state): State<ApiState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ServiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state
        .services
        .update(id, payload.into())
        .await
        .map_err(content_to_api)?;
    Ok(Json(service))
}

pub async fn delete_service(
    State(state): State<ApiState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.services.delete(id).await.map_err(content_to_api)?;
    Ok(Json(MessageResponse::new("Service removed")))
}
