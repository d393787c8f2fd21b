//! Search handlers

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::Deserialize;

use super::{ApiQuery, criteria_to_api, repo_to_api};
use crate::application::search::{SearchDomain, SearchQuery, SearchScope};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{
    AppliedFilters, PopularTermsResponse, SearchResponse, SuggestionsResponse,
};
use crate::infra::http::api::state::ApiState;

type QueryPairs = Vec<(String, String)>;

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    pub q: Option<String>,
}

pub async fn search_everything(
    State(state): State<ApiState>,
    ApiQuery(pairs): ApiQuery<QueryPairs>,
) -> Result<impl IntoResponse, ApiError> {
    let query: SearchQuery = pairs.into_iter().collect();
    let criteria = query.into_text_criteria().map_err(criteria_to_api)?;
    let hits = state
        .search
        .search_basic(&criteria, SearchScope::All)
        .await
        .map_err(repo_to_api)?;
    Ok(Json(SearchResponse::all(hits)))
}

pub async fn search_projects(
    State(state): State<ApiState>,
    ApiQuery(pairs): ApiQuery<QueryPairs>,
) -> Result<impl IntoResponse, ApiError> {
    let query: SearchQuery = pairs.into_iter().collect();
    let criteria = query.into_text_criteria().map_err(criteria_to_api)?;
    let hits = state
        .search
        .search_basic(&criteria, SearchScope::Only(SearchDomain::Projects))
        .await
        .map_err(repo_to_api)?;
    Ok(Json(SearchResponse::projects(hits)))
}

pub async fn search_blogs(
    State(state): State<ApiState>,
    ApiQuery(pairs): ApiQuery<QueryPairs>,
) -> Result<impl IntoResponse, ApiError> {
    let query: SearchQuery = pairs.into_iter().collect();
    let criteria = query.into_text_criteria().map_err(criteria_to_api)?;
    let hits = state
        .search
        .search_basic(&criteria, SearchScope::Only(SearchDomain::Blogs))
        .await
        .map_err(repo_to_api)?;
    Ok(Json(SearchResponse::blogs(hits)))
}

pub async fn advanced_search_projects(
    State(state): State<ApiState>,
    ApiQuery(pairs): ApiQuery<QueryPairs>,
) -> Result<impl IntoResponse, ApiError> {
    let query: SearchQuery = pairs.into_iter().collect();
    let criteria = query
        .into_criteria(SearchDomain::Projects)
        .map_err(criteria_to_api)?;
    let hits = state
        .search
        .search_advanced(&criteria, SearchScope::Only(SearchDomain::Projects))
        .await
        .map_err(repo_to_api)?;
    Ok(Json(
        SearchResponse::projects(hits).with_filters(AppliedFilters::projects(&criteria)),
    ))
}

pub async fn advanced_search_blogs(
    State(state): State<ApiState>,
    ApiQuery(pairs): ApiQuery<QueryPairs>,
) -> Result<impl IntoResponse, ApiError> {
    let query: SearchQuery = pairs.into_iter().collect();
    let criteria = query
        .into_criteria(SearchDomain::Blogs)
        .map_err(criteria_to_api)?;
    let hits = state
        .search
        .search_advanced(&criteria, SearchScope::Only(SearchDomain::Blogs))
        .await
        .map_err(repo_to_api)?;
    Ok(Json(
        SearchResponse::blogs(hits).with_filters(AppliedFilters::blogs(&criteria)),
    ))
}

pub async fn search_suggestions(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<SuggestionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let suggestions = state
        .search
        .suggestions(query.q.as_deref())
        .await
        .map_err(repo_to_api)?;
    Ok(Json(SuggestionsResponse { suggestions }))
}

pub async fn popular_search_terms(State(state): State<ApiState>) -> impl IntoResponse {
    Json(PopularTermsResponse {
        popular_terms: state.search.popular_terms(),
    })
}
