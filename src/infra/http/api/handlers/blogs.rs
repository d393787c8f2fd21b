//! Blog, comment and reaction handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use super::{ApiJson, ApiPath, content_to_api};
use crate::domain::types::ReactionOutcome;
use crate::infra::http::api::auth::AdminUser;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{
    BlogRequest, CommentRequest, MessageResponse, ReactionRequest,
};
use crate::infra::http::api::state::ApiState;

pub async fn list_blogs(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let blogs = state.blogs.list().await.map_err(content_to_api)?;
    Ok(Json(blogs))
}

pub async fn get_blog(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let blog = state.blogs.get(id).await.map_err(content_to_api)?;
    Ok(Json(blog))
}

pub async fn create_blog(
    State(state): State<ApiState>,
    _admin: AdminUser,
    ApiJson(payload): ApiJson<BlogRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let blog = state
        .blogs
        .create(payload.into())
        .await
        .map_err(content_to_api)?;
    Ok((StatusCode::CREATED, Json(blog)))
}

pub async fn update_blog(
    State(state): State<ApiState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BlogRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let blog = state
        .blogs
        .update(id, payload.into())
        .await
        .map_err(content_to_api)?;
    Ok(Json(blog))
}

pub async fn delete_blog(
    State(state): State<ApiState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.blogs.delete(id).await.map_err(content_to_api)?;
    Ok(Json(MessageResponse::new("Blog removed")))
}

pub async fn list_comments(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = state.blogs.comments(id).await.map_err(content_to_api)?;
    Ok(Json(comments))
}

pub async fn add_comment(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .blogs
        .add_comment(id, payload.into())
        .await
        .map_err(content_to_api)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_reactions(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let reactions = state.blogs.reactions(id).await.map_err(content_to_api)?;
    Ok(Json(reactions))
}

/// 201 for a first reaction, 200 when an earlier one was replaced.
pub async fn add_reaction(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ReactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (reaction, outcome) = state
        .blogs
        .react(id, payload.into())
        .await
        .map_err(content_to_api)?;
    let status = match outcome {
        ReactionOutcome::Created => StatusCode::CREATED,
        ReactionOutcome::Updated => StatusCode::OK,
    };
    Ok((status, Json(reaction)))
}
