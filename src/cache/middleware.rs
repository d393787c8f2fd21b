//! Response cache middleware.
//!
//! Serves `/api` GET requests from the cache when possible and records
//! successful responses on the way out.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, header},
    middleware::Next,
    response::Response,
};
use http_body_util::BodyExt;
use tracing::{debug, instrument, warn};

use super::{CachePolicy, CachedPayload, ResponseCache, keys::request_key};

const CACHE_STATUS_HEADER: &str = "x-cache";
const API_PREFIX: &str = "/api";

/// Shared cache state for middleware.
#[derive(Clone)]
pub struct CacheState {
    pub cache: ResponseCache,
    pub policy: Arc<CachePolicy>,
}

#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn response_cache_layer(
    State(state): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.policy.enabled || !is_cacheable_request(&request) {
        return next.run(request).await;
    }

    let key = request_key(request.uri());
    if let Some(payload) = state.cache.lookup(&key) {
        debug!(target = "cache::middleware", key = %key, outcome = "hit");
        return build_response(payload);
    }

    let ttl = state.policy.ttl_for(request.uri().path());
    let response = next.run(request).await;
    if !response.status().is_success() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    match BodyExt::collect(body).await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            let content_type = parts
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            state.cache.store(
                key.clone(),
                CachedPayload {
                    content_type,
                    body: bytes.clone(),
                },
                ttl,
            );
            debug!(
                target = "cache::middleware",
                key = %key,
                ttl_secs = ttl.as_secs(),
                outcome = "miss"
            );
            parts
                .headers
                .insert(CACHE_STATUS_HEADER, HeaderValue::from_static("MISS"));
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(error) => {
            warn!(
                target = "cache::middleware",
                key = %key,
                error = %error,
                "failed to buffer response body"
            );
            Response::from_parts(parts, Body::empty())
        }
    }
}

/// Reads under `/api` only. Authenticated requests bypass the shared cache so
/// one caller's private view is never replayed to another.
fn is_cacheable_request(request: &Request<Body>) -> bool {
    if request.method() != Method::GET {
        return false;
    }
    if request.headers().contains_key(header::AUTHORIZATION) {
        return false;
    }
    let path = request.uri().path();
    path == API_PREFIX || path.starts_with("/api/")
}

fn build_response(payload: CachedPayload) -> Response {
    let mut response = Response::new(Body::from(payload.body));
    let headers = response.headers_mut();
    if let Some(value) = payload
        .content_type
        .as_deref()
        .and_then(|value| HeaderValue::from_str(value).ok())
    {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(CACHE_STATUS_HEADER, HeaderValue::from_static("HIT"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    #[test]
    fn only_api_reads_are_cacheable() {
        assert!(is_cacheable_request(&request(Method::GET, "/api/projects")));
        assert!(!is_cacheable_request(&request(Method::POST, "/api/projects")));
        assert!(!is_cacheable_request(&request(Method::GET, "/")));
        assert!(!is_cacheable_request(&request(Method::GET, "/uploads/a.png")));
        assert!(!is_cacheable_request(&request(Method::GET, "/apiary")));
    }

    #[test]
    fn authorized_requests_bypass_cache() {
        let mut req = request(Method::GET, "/api/admin/dashboard");
        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer pt_x_y"),
        );
        assert!(!is_cacheable_request(&req));
    }

    #[test]
    fn cached_payload_keeps_content_type() {
        let response = build_response(CachedPayload::json("{}"));
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        assert_eq!(
            response.headers().get(CACHE_STATUS_HEADER),
            Some(&HeaderValue::from_static("HIT"))
        );
    }
}
