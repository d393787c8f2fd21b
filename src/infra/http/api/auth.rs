//! Bearer-token extractors for member and admin routes.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};

use crate::application::users::{AuthError, AuthenticatedUser};
use crate::infra::http::RequestContext;

use super::error::ApiError;
use super::handlers::auth_to_api;
use super::state::ApiState;

/// Any signed-in user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedUser);

/// A signed-in user whose e-mail matches the configured admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl FromRequestParts<ApiState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers).map_err(auth_to_api)?;
        let user = state
            .users
            .authenticate(&token)
            .await
            .map_err(auth_to_api)?;
        if let Some(ctx) = parts.extensions.get::<RequestContext>() {
            ctx.set_user(user.id);
        }
        Ok(Self(user))
    }
}

impl FromRequestParts<ApiState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        state.users.require_admin(&user).map_err(auth_to_api)?;
        Ok(Self(user))
    }
}

/// `Bearer` scheme present but no credential after it counts as a bad token.
fn extract_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::Missing)?;
    let rest = raw.strip_prefix("Bearer").ok_or(AuthError::Missing)?;
    let token = rest.trim();
    if token.is_empty() {
        return Err(AuthError::Invalid);
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(
            extract_token(&headers("Bearer pt_abc_def")).expect("token"),
            "pt_abc_def"
        );
    }

    #[test]
    fn other_schemes_count_as_missing() {
        assert!(matches!(
            extract_token(&headers("Basic dXNlcg==")),
            Err(AuthError::Missing)
        ));
        assert!(matches!(
            extract_token(&HeaderMap::new()),
            Err(AuthError::Missing)
        ));
    }

    #[test]
    fn empty_bearer_is_invalid() {
        assert!(matches!(
            extract_token(&headers("Bearer ")),
            Err(AuthError::Invalid)
        ));
    }
}
