mod support;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use serde_json::json;

use support::TestApp;

fn project(title: &str) -> serde_json::Value {
    json!({"title": title, "description": "cached", "techStack": ["Rust"]})
}

#[tokio::test]
async fn second_read_is_served_from_cache() {
    let app = TestApp::new();

    let first = app.get("/api/projects").await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.cache_status(), Some("MISS"));

    let second = app.get("/api/projects").await;
    assert_eq!(second.cache_status(), Some("HIT"));
    assert_eq!(second.body, first.body);
    assert_eq!(app.cache.len(), 1);
}

#[tokio::test]
async fn writes_leave_cached_reads_stale_until_cleared() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let empty = app.get("/api/projects").await;
    assert_eq!(empty.body, json!([]));

    app.create_project(&admin, project("Fresh")).await;

    let stale = app.get("/api/projects").await;
    assert_eq!(stale.cache_status(), Some("HIT"));
    assert_eq!(stale.body, json!([]));

    let cleared = app
        .call(
            Method::POST,
            "/api/admin/clear-cache",
            Some(&admin),
            Some(json!({"path": "projects"})),
        )
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.body, json!({"message": "Cache cleared successfully"}));

    let fresh = app.get("/api/projects").await;
    assert_eq!(fresh.cache_status(), Some("MISS"));
    assert_eq!(fresh.body[0]["title"], "Fresh");
}

#[tokio::test]
async fn clearing_without_a_path_drops_everything() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    app.get("/api/projects").await;
    app.get("/api/blogs").await;
    app.get("/api/search?q=rust").await;
    assert_eq!(app.cache.len(), 3);

    app.call(
        Method::POST,
        "/api/admin/clear-cache",
        Some(&admin),
        Some(json!({})),
    )
    .await;
    assert!(app.cache.is_empty());
}

#[tokio::test]
async fn clearing_with_an_empty_body_drops_everything() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    app.get("/api/skills").await;
    app.get("/api/services").await;
    assert_eq!(app.cache.len(), 2);

    let cleared = app
        .call(Method::POST, "/api/admin/clear-cache", Some(&admin), None)
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.body, json!({"message": "Cache cleared successfully"}));
    assert!(app.cache.is_empty());

    app.get("/api/skills").await;
    let (status, _, body) = app
        .send(
            axum::http::Request::builder()
                .method(Method::POST)
                .uri("/api/admin/clear-cache")
                .header("authorization", format!("Bearer {admin}"))
                .header("content-type", "application/json")
                .body(axum::body::Body::from("{not json"))
                .expect("request"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(body["message"], "Invalid request body");
    assert_eq!(app.cache.len(), 1);
}

#[tokio::test]
async fn entries_expire_after_their_ttl() {
    let app = TestApp::new();

    app.get("/api/skills").await;
    app.clock.advance(Duration::from_secs(299));
    assert_eq!(app.get("/api/skills").await.cache_status(), Some("HIT"));

    app.clock.advance(Duration::from_secs(2));
    assert_eq!(app.get("/api/skills").await.cache_status(), Some("MISS"));
}

#[tokio::test]
async fn suggestions_use_a_shorter_ttl() {
    let app = TestApp::new();

    app.get("/api/search/suggestions?q=ru").await;
    app.clock.advance(Duration::from_secs(121));
    assert_eq!(
        app.get("/api/search/suggestions?q=ru").await.cache_status(),
        Some("MISS")
    );

    app.get("/api/search/popular").await;
    app.clock.advance(Duration::from_secs(600));
    assert_eq!(
        app.get("/api/search/popular").await.cache_status(),
        Some("HIT")
    );
}

#[tokio::test]
async fn query_strings_are_cached_separately() {
    let app = TestApp::new();

    app.get("/api/search?q=rust").await;
    let other = app.get("/api/search?q=react").await;
    assert_eq!(other.cache_status(), Some("MISS"));
}

#[tokio::test]
async fn errors_and_authorized_reads_are_not_cached() {
    let app = TestApp::new();

    let missing = app.get("/api/search").await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.cache_status(), None);

    let token = app.register("Reader", "reader@example.com").await;
    let authorized = app
        .call(Method::GET, "/api/projects", Some(&token), None)
        .await;
    assert_eq!(authorized.cache_status(), None);
    assert!(app.cache.is_empty());

    let welcome = app.get("/").await;
    assert_eq!(welcome.cache_status(), None);
}

#[tokio::test]
async fn disabled_cache_never_answers() {
    let app = TestApp::uncached();

    app.get("/api/projects").await;
    let again = app.get("/api/projects").await;
    assert_eq!(again.cache_status(), None);
    assert!(app.cache.is_empty());
}
