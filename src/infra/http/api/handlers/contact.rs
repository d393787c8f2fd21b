//! Newsletter subscription and contact-message handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::{ApiJson, content_to_api};
use crate::infra::http::api::auth::AdminUser;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{MessageRequest, SubscribeRequest};
use crate::infra::http::api::state::ApiState;

pub async fn subscribe(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<SubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let subscriber = state
        .subscribers
        .subscribe(payload.into())
        .await
        .map_err(content_to_api)?;
    Ok((StatusCode::CREATED, Json(subscriber)))
}

pub async fn list_subscribers(
    State(state): State<ApiState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let subscribers = state.subscribers.list().await.map_err(content_to_api)?;
    Ok(Json(subscribers))
}

pub async fn submit_message(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<MessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .messages
        .submit(payload.into())
        .await
        .map_err(content_to_api)?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn list_messages(
    State(state): State<ApiState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let messages = state.messages.list().await.map_err(content_to_api)?;
    Ok(Json(messages))
}
