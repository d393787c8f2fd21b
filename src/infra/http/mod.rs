pub mod api;
mod middleware;
mod public;

pub use api::{ApiState, build_api_router};
pub(crate) use middleware::METRIC_HTTP_RESPONSES;
pub use middleware::RequestContext;

use axum::{Router, middleware as axum_middleware, routing::get};

use crate::cache::response_cache_layer;

use self::middleware::{log_responses, set_request_context};

/// Full application router: API routes, uploaded files, welcome banner and 404 fallback.
///
/// The response cache wraps everything and decides per request whether it applies,
/// so it always sees the complete `/api/...` path and query.
pub fn build_router(state: ApiState) -> Router {
    let cache_state = state.cache_state();
    let upload_limit = state.upload_storage.max_file_bytes();

    Router::new()
        .route("/", get(public::welcome))
        .route("/uploads/{*path}", get(public::serve_upload))
        .merge(build_api_router(upload_limit))
        .fallback(public::route_not_found)
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            cache_state,
            response_cache_layer,
        ))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
