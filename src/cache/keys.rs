//! Cache key derivation.

use axum::http::Uri;

/// Path plus raw query string, so every filter combination is cached on its own.
pub fn request_key(uri: &Uri) -> String {
    match uri.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", uri.path(), query),
        _ => uri.path().to_string(),
    }
}

/// Key an admin refers to by its path under `/api`.
pub fn api_key(path: &str) -> String {
    format!("/api/{}", path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_part_of_the_key() {
        let plain: Uri = "/api/search?q=rust".parse().expect("uri");
        let other: Uri = "/api/search?q=react".parse().expect("uri");
        assert_eq!(request_key(&plain), "/api/search?q=rust");
        assert_ne!(request_key(&plain), request_key(&other));
    }

    #[test]
    fn bare_path_has_no_question_mark() {
        let uri: Uri = "/api/projects?".parse().expect("uri");
        assert_eq!(request_key(&uri), "/api/projects");
    }

    #[test]
    fn api_key_prefixes_relative_paths() {
        assert_eq!(api_key("projects"), "/api/projects");
        assert_eq!(api_key("/blogs?tags=a"), "/api/blogs?tags=a");
    }
}
