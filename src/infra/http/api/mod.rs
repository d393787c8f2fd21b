pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

/// Multipart framing on top of the raw file bytes.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_api_router(upload_limit_bytes: u64) -> Router<ApiState> {
    let upload_body_limit = usize::try_from(upload_limit_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route(
            "/api/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route(
            "/api/blogs",
            get(handlers::list_blogs).post(handlers::create_blog),
        )
        .route(
            "/api/blogs/{id}",
            get(handlers::get_blog)
                .put(handlers::update_blog)
                .delete(handlers::delete_blog),
        )
        .route(
            "/api/blogs/{id}/comments",
            get(handlers::list_comments).post(handlers::add_comment),
        )
        .route(
            "/api/blogs/{id}/reactions",
            get(handlers::list_reactions).post(handlers::add_reaction),
        )
        .route(
            "/api/skills",
            get(handlers::list_skills).post(handlers::create_skill),
        )
        .route(
            "/api/skills/{id}",
            put(handlers::update_skill).delete(handlers::delete_skill),
        )
        .route(
            "/api/services",
            get(handlers::list_services).post(handlers::create_service),
        )
        .route(
            "/api/services/{id}",
            put(handlers::update_service).delete(handlers::delete_service),
        )
        .route(
            "/api/subscribe",
            get(handlers::list_subscribers).post(handlers::subscribe),
        )
        .route(
            "/api/messages",
            get(handlers::list_messages).post(handlers::submit_message),
        )
        .route("/api/users", post(handlers::register_user))
        .route("/api/users/login", post(handlers::login_user))
        .route(
            "/api/users/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route(
            "/api/upload/projects",
            post(handlers::upload_project_image).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route(
            "/api/upload/blogs",
            post(handlers::upload_blog_image).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/api/search", get(handlers::search_everything))
        .route("/api/search/projects", get(handlers::search_projects))
        .route("/api/search/blogs", get(handlers::search_blogs))
        .route(
            "/api/search/projects/advanced",
            get(handlers::advanced_search_projects),
        )
        .route(
            "/api/search/blogs/advanced",
            get(handlers::advanced_search_blogs),
        )
        .route("/api/search/suggestions", get(handlers::search_suggestions))
        .route("/api/search/popular", get(handlers::popular_search_terms))
        .route("/api/admin/dashboard", get(handlers::admin_dashboard))
        .route("/api/admin/stats", get(handlers::admin_stats))
        .route("/api/admin/analytics", get(handlers::admin_analytics))
        .route("/api/admin/clear-cache", post(handlers::clear_cache))
}
