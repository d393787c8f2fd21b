//! Admin dashboard handlers

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use tracing::info;

use super::{ApiJson, repo_to_api};
use crate::cache::api_key;
use crate::infra::http::api::auth::AdminUser;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{ClearCacheRequest, MessageResponse};
use crate::infra::http::api::state::ApiState;

pub async fn admin_dashboard(
    State(state): State<ApiState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.admin.dashboard().await.map_err(repo_to_api)?;
    Ok(Json(view))
}

pub async fn admin_stats(
    State(state): State<ApiState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.admin.stats().await.map_err(repo_to_api)?;
    Ok(Json(view))
}

pub async fn admin_analytics(
    State(state): State<ApiState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.admin.analytics().await.map_err(repo_to_api)?;
    Ok(Json(view))
}

/// The body is optional. With a `path` only `/api/<path>` is evicted; without one the whole cache is dropped.
pub async fn clear_cache(
    State(state): State<ApiState>,
    AdminUser(admin): AdminUser,
    payload: Option<ApiJson<ClearCacheRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|ApiJson(payload)| payload).unwrap_or_default();
    let key = payload
        .path
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(api_key);
    let removed = state.cache.evict(key.as_deref());

    info!(
        target = "portfolio::admin::cache",
        actor = %admin.email,
        key = key.as_deref().unwrap_or("*"),
        removed,
        "response cache cleared"
    );
    Ok(Json(MessageResponse::new("Cache cleared successfully")))
}
