mod support;

use axum::http::StatusCode;
use serde_json::{Value, json};

use support::TestApp;

async fn seeded() -> TestApp {
    let app = TestApp::uncached();
    let admin = app.admin_token().await;

    app.create_project(
        &admin,
        json!({
            "title": "Realtime dashboard",
            "description": "Charts streamed over websockets",
            "techStack": ["React", "Node.js"]
        }),
    )
    .await;
    app.create_project(
        &admin,
        json!({
            "title": "Inventory service",
            "description": "A small REST backend",
            "techStack": ["Rust", "PostgreSQL"]
        }),
    )
    .await;
    app.create_blog(
        &admin,
        json!({
            "title": "Learning React hooks",
            "content": "State without classes",
            "tags": ["React", "Frontend"]
        }),
    )
    .await;
    app.create_blog(
        &admin,
        json!({
            "title": "Ownership explained",
            "content": "Borrowing rules with examples",
            "tags": ["Rust"]
        }),
    )
    .await;

    app
}

/// Titles in response order.
fn titles(items: &Value) -> Vec<String> {
    items
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn global_search_spans_both_domains() {
    let app = seeded().await;

    let response = app.get("/api/search?q=React").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(titles(&response.body["projects"]), vec!["Realtime dashboard"]);
    assert_eq!(titles(&response.body["blogs"]), vec!["Learning React hooks"]);
    assert_eq!(response.body["total"], 2);
    assert!(response.body.get("filters").is_none());
}

#[tokio::test]
async fn exact_tag_matches_count_as_hits() {
    let app = seeded().await;

    let response = app.get("/api/search/projects?q=PostgreSQL").await;
    assert_eq!(titles(&response.body["projects"]), vec!["Inventory service"]);
    assert!(response.body.get("blogs").is_none());

    let partial = app.get("/api/search/projects?q=Postgre").await;
    assert_eq!(partial.body["total"], 0);
}

#[tokio::test]
async fn scoped_search_returns_one_domain() {
    let app = seeded().await;

    let response = app.get("/api/search/blogs?q=%20borrowing%20").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(titles(&response.body["blogs"]), vec!["Ownership explained"]);
    assert!(response.body.get("projects").is_none());
    assert_eq!(response.body["blogs"][0]["comments"], json!([]));
}

#[tokio::test]
async fn missing_query_is_rejected() {
    let app = seeded().await;

    for uri in [
        "/api/search",
        "/api/search?q=",
        "/api/search/projects?q=%20%20",
        "/api/search/blogs/advanced?tags=Rust",
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            response.body,
            json!({"message": "Search query is required"}),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn basic_search_ignores_filter_parameters() {
    let app = seeded().await;

    let response = app
        .get("/api/search/blogs?q=react&dateFrom=not-a-date&tags=Rust")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(titles(&response.body["blogs"]), vec!["Learning React hooks"]);
}

#[tokio::test]
async fn advanced_project_search_requires_stack_overlap() {
    let app = seeded().await;

    let response = app
        .get("/api/search/projects/advanced?q=e&techStack=Rust,%20Go")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(titles(&response.body["projects"]), vec!["Inventory service"]);
    assert_eq!(
        response.body["filters"],
        json!({"query": "e", "techStack": ["Rust", "Go"]})
    );
}

#[tokio::test]
async fn advanced_blog_search_applies_tags_and_dates() {
    let app = seeded().await;

    let tagged = app
        .get("/api/search/blogs/advanced?q=e&tags=Frontend&dateFrom=2000-01-01")
        .await;
    assert_eq!(tagged.status, StatusCode::OK);
    assert_eq!(titles(&tagged.body["blogs"]), vec!["Learning React hooks"]);
    assert_eq!(tagged.body["filters"]["tags"], json!(["Frontend"]));
    assert_eq!(tagged.body["filters"]["dateFrom"], "2000-01-01T00:00:00Z");
    assert_eq!(tagged.body["filters"]["dateTo"], Value::Null);

    let too_old = app
        .get("/api/search/blogs/advanced?q=e&dateTo=2000-01-01")
        .await;
    assert_eq!(too_old.body["total"], 0);

    let invalid = app
        .get("/api/search/blogs/advanced?q=e&dateFrom=yesterday")
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.body, json!({"message": "Invalid dateFrom format"}));
}

#[tokio::test]
async fn suggestions_need_two_characters() {
    let app = seeded().await;

    let short = app.get("/api/search/suggestions?q=r").await;
    assert_eq!(short.body, json!({"suggestions": []}));

    let missing = app.get("/api/search/suggestions").await;
    assert_eq!(missing.body, json!({"suggestions": []}));

    let response = app.get("/api/search/suggestions?q=React").await;
    let suggestions = response.body["suggestions"].as_array().expect("array");
    let kinds: Vec<&str> = suggestions
        .iter()
        .filter_map(|item| item["type"].as_str())
        .collect();
    assert_eq!(kinds, vec!["project", "blog"]);
    assert_eq!(suggestions[0]["title"], "Realtime dashboard");
    assert!(suggestions[1]["id"].as_str().is_some());
}

#[tokio::test]
async fn popular_terms_are_fixed() {
    let app = TestApp::uncached();

    let response = app.get("/api/search/popular").await;
    assert_eq!(response.status, StatusCode::OK);
    let terms = response.body["popularTerms"].as_array().expect("array");
    assert_eq!(terms.len(), 10);
    assert_eq!(terms[0], "JavaScript");
}

#[tokio::test]
async fn results_come_back_newest_first() {
    let app = TestApp::uncached();
    let admin = app.admin_token().await;

    for n in 0..5 {
        app.create_project(
            &admin,
            json!({"title": format!("App {n}"), "description": "demo", "techStack": ["Rust"]}),
        )
        .await;
    }
    for title in ["Oldest app notes", "Middle app notes", "Newest app notes"] {
        app.create_blog(&admin, json!({"title": title, "content": "body"}))
            .await;
    }

    let response = app.get("/api/search?q=app").await;
    assert_eq!(
        titles(&response.body["projects"]),
        vec!["App 4", "App 3", "App 2", "App 1", "App 0"]
    );
    assert_eq!(
        titles(&response.body["blogs"]),
        vec!["Newest app notes", "Middle app notes", "Oldest app notes"]
    );
    assert_eq!(response.body["total"], 8);
}

#[tokio::test]
async fn suggestions_take_three_per_domain() {
    let app = TestApp::uncached();
    let admin = app.admin_token().await;

    for n in 0..4 {
        app.create_project(
            &admin,
            json!({"title": format!("Widget {n}"), "description": "demo", "techStack": ["Rust"]}),
        )
        .await;
        app.create_blog(
            &admin,
            json!({"title": format!("Widget post {n}"), "content": "body"}),
        )
        .await;
    }

    let response = app.get("/api/search/suggestions?q=widget").await;
    let suggestions = response.body["suggestions"].as_array().expect("array");
    let listed: Vec<(&str, &str)> = suggestions
        .iter()
        .filter_map(|item| Some((item["type"].as_str()?, item["title"].as_str()?)))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("project", "Widget 3"),
            ("project", "Widget 2"),
            ("project", "Widget 1"),
            ("blog", "Widget post 3"),
            ("blog", "Widget post 2"),
            ("blog", "Widget post 1"),
        ]
    );
}

#[tokio::test]
async fn unmatched_terms_return_nothing() {
    let app = TestApp::uncached();
    let admin = app.admin_token().await;

    app.create_project(
        &admin,
        json!({"title": "Chat App", "description": "Messaging", "techStack": ["Node.js"]}),
    )
    .await;
    app.create_project(
        &admin,
        json!({"title": "Portfolio Site", "description": "Personal pages", "techStack": ["React"]}),
    )
    .await;

    let hits = app.get("/api/search/projects?q=app").await;
    assert_eq!(titles(&hits.body["projects"]), vec!["Chat App"]);
    assert_eq!(hits.body["total"], 1);

    let none = app.get("/api/search/projects?q=xyz").await;
    assert_eq!(none.status, StatusCode::OK);
    assert_eq!(none.body["projects"], json!([]));
    assert_eq!(none.body["total"], 0);
}

#[tokio::test]
async fn repeated_filter_keys_are_merged() {
    let app = seeded().await;

    let response = app
        .get("/api/search/blogs/advanced?q=e&tags=Rust&tags=Frontend")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        titles(&response.body["blogs"]),
        vec!["Ownership explained", "Learning React hooks"]
    );
    assert_eq!(response.body["filters"]["tags"], json!(["Rust", "Frontend"]));

    let stacks = app
        .get("/api/search/projects/advanced?q=e&techStack=Go&techStack=React")
        .await;
    assert_eq!(titles(&stacks.body["projects"]), vec!["Realtime dashboard"]);

    let doubled = app.get("/api/search?q=Rust&q=React").await;
    assert_eq!(doubled.status, StatusCode::OK);
    assert_eq!(titles(&doubled.body["projects"]), vec!["Inventory service"]);
}

#[tokio::test]
async fn malformed_query_strings_render_json_errors() {
    let app = seeded().await;

    let response = app.get("/api/search/suggestions?q=re&q=ru").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Invalid query string");
}
