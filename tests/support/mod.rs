//! Shared harness: the full router over in-memory storage.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use portfolio_api::cache::{CachePolicy, CacheState, ManualClock, ResponseCache};
use portfolio_api::config::{AuthSettings, CacheSettings};
use portfolio_api::infra::http::{ApiState, build_router};
use portfolio_api::infra::memory::InMemoryRepositories;
use portfolio_api::infra::notify::LogNotifier;
use portfolio_api::infra::uploads::UploadStorage;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const MAX_UPLOAD_BYTES: u64 = 1024;

pub struct TestApp {
    pub router: Router,
    pub cache: ResponseCache,
    pub clock: Arc<ManualClock>,
    _uploads: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn cache_status(&self) -> Option<&str> {
        self.headers
            .get("x-cache")
            .and_then(|value| value.to_str().ok())
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Same router with the response cache switched off, for tests that read after writing.
    pub fn uncached() -> Self {
        Self::build(false)
    }

    fn build(cache_enabled: bool) -> Self {
        let uploads = tempfile::tempdir().expect("tempdir");
        let storage = UploadStorage::new(uploads.path().join("uploads"), MAX_UPLOAD_BYTES)
            .expect("upload storage");

        let clock = Arc::new(ManualClock::new());
        let cache = ResponseCache::with_clock(clock.clone());
        let settings = CacheSettings {
            enabled: cache_enabled,
            ..CacheSettings::default()
        };
        let cache_state = CacheState {
            cache: cache.clone(),
            policy: Arc::new(CachePolicy::from(&settings)),
        };

        let auth = AuthSettings {
            admin_email: ADMIN_EMAIL.to_string(),
            token_ttl: Duration::from_secs(3600),
        };
        let state = ApiState::new(
            Arc::new(InMemoryRepositories::new()),
            &auth,
            Arc::new(LogNotifier),
            cache_state,
            Arc::new(storage),
        );

        Self {
            router: build_router(state),
            cache,
            clock,
            _uploads: uploads,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("response body")
            .to_bytes();
        (status, headers, body)
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let (status, headers, bytes) = self.send(request).await;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.call(Method::GET, uri, None, None).await
    }

    pub async fn register(&self, name: &str, email: &str) -> String {
        let response = self
            .call(
                Method::POST,
                "/api/users",
                None,
                Some(json!({"name": name, "email": email, "password": "secret123"})),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["token"]
            .as_str()
            .expect("token")
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.register("Admin", ADMIN_EMAIL).await
    }

    pub async fn create_project(&self, token: &str, body: Value) -> Value {
        let response = self
            .call(Method::POST, "/api/projects", Some(token), Some(body))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body
    }

    pub async fn create_blog(&self, token: &str, body: Value) -> Value {
        let response = self
            .call(Method::POST, "/api/blogs", Some(token), Some(body))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body
    }
}
