//! Accounts, password verification and bearer-token sessions.

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreateSessionParams, CreateUserParams, RepoError, SessionsRepo, UpdateUserParams, UsersRepo,
};
use crate::domain::entities::UserRecord;
use crate::domain::validation::{FieldErrors, non_blank, normalize_email};

const TOKEN_PREFIX: &str = "pt";
const MIN_SECRET_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 6;
const PASSWORD_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("User already exists")]
    AlreadyExists,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("User not found")]
    NotFound,
    #[error(transparent)]
    Password(#[from] PasswordHashError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("password hashing failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<FieldErrors> for UserError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not authorized, no token provided")]
    Missing,
    #[error("Not authorized, token failed")]
    Invalid,
    #[error("Not authorized, user not found")]
    UserNotFound,
    #[error("Not authorized as an admin")]
    Forbidden,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Default)]
pub struct RegisterCommand {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileCommand {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Identity attached to a request after its bearer token was verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedSession {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UsersRepo>,
    sessions: Arc<dyn SessionsRepo>,
    admin_email: String,
    token_ttl: Duration,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UsersRepo>,
        sessions: Arc<dyn SessionsRepo>,
        admin_email: impl Into<String>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            admin_email: normalize_email(&admin_email.into()),
            token_ttl,
        }
    }

    pub async fn register(&self, cmd: RegisterCommand) -> Result<IssuedSession, UserError> {
        let mut errors = FieldErrors::new();
        errors.require("name", &cmd.name, "Name is required");
        errors.require_email("email", &cmd.email);
        if cmd.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push("password", "Password must be at least 6 characters long");
        }
        errors.into_result()?;

        let email = normalize_email(&cmd.email);
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(UserError::AlreadyExists);
        }

        let password_hash = hash_password(&cmd.password).await?;
        let user = self
            .users
            .create_user(CreateUserParams {
                name: cmd.name.trim().to_string(),
                email,
                password_hash,
            })
            .await
            .map_err(duplicate_as_exists)?;

        tracing::info!(target = "application::users", id = %user.id, "user registered");
        self.issue_session(user).await
    }

    pub async fn login(&self, cmd: LoginCommand) -> Result<IssuedSession, UserError> {
        let mut errors = FieldErrors::new();
        errors.require_email("email", &cmd.email);
        if cmd.password.is_empty() {
            errors.push("password", "Password is required");
        }
        errors.into_result()?;

        let user = self
            .users
            .find_user_by_email(&normalize_email(&cmd.email))
            .await?
            .ok_or(UserError::InvalidCredentials)?;
        if !verify_password(&cmd.password, &user.password_hash).await {
            return Err(UserError::InvalidCredentials);
        }

        self.issue_session(user).await
    }

    pub async fn profile(&self, id: Uuid) -> Result<UserProfile, UserError> {
        let user = self.users.find_user(id).await?.ok_or(UserError::NotFound)?;
        Ok(UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        })
    }

    /// Blank fields keep their current value; a fresh token is issued on success.
    pub async fn update_profile(
        &self,
        id: Uuid,
        cmd: UpdateProfileCommand,
    ) -> Result<IssuedSession, UserError> {
        let name = non_blank(cmd.name);
        let email = non_blank(cmd.email);
        let password = cmd.password.filter(|password| !password.is_empty());

        let mut errors = FieldErrors::new();
        if let Some(email) = email.as_deref() {
            errors.require_email("email", email);
        }
        if let Some(password) = password.as_deref()
            && password.chars().count() < MIN_PASSWORD_LEN
        {
            errors.push("password", "Password must be at least 6 characters long");
        }
        errors.into_result()?;

        let current = self.users.find_user(id).await?.ok_or(UserError::NotFound)?;
        let password_hash = match password {
            Some(password) => hash_password(&password).await?,
            None => current.password_hash,
        };
        let updated = self
            .users
            .update_user(UpdateUserParams {
                id,
                name: name.unwrap_or(current.name),
                email: email
                    .map(|email| normalize_email(&email))
                    .unwrap_or(current.email),
                password_hash,
            })
            .await
            .map_err(duplicate_as_exists)?;

        self.issue_session(updated).await
    }

    /// Resolves a raw bearer token to the user it was issued for.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let parsed = parse_token(token).ok_or(AuthError::Invalid)?;
        let session = self
            .sessions
            .find_session_by_prefix(&parsed.prefix)
            .await?
            .ok_or(AuthError::Invalid)?;

        if session.expires_at <= OffsetDateTime::now_utc() {
            return Err(AuthError::Invalid);
        }

        let hashed_input = hash_secret(&parsed.secret);
        if session.hashed_secret.ct_eq(&hashed_input).unwrap_u8() == 0 {
            return Err(AuthError::Invalid);
        }

        let user = self
            .users
            .find_user(session.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(AuthenticatedUser {
            id: user.id,
            name: user.name,
            email: user.email,
        })
    }

    pub fn is_admin(&self, user: &AuthenticatedUser) -> bool {
        normalize_email(&user.email) == self.admin_email
    }

    pub fn require_admin(&self, user: &AuthenticatedUser) -> Result<(), AuthError> {
        if self.is_admin(user) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }

    async fn issue_session(&self, user: UserRecord) -> Result<IssuedSession, UserError> {
        let prefix = generate_prefix();
        let secret = generate_secret();
        let token = format!("{TOKEN_PREFIX}_{prefix}_{secret}");
        let ttl = time::Duration::try_from(self.token_ttl)
            .map_err(|err| RepoError::InvalidInput {
                message: format!("token ttl out of range: {err}"),
            })?;

        let now = OffsetDateTime::now_utc();
        let purged = self.sessions.delete_expired_sessions(now).await?;
        if purged > 0 {
            tracing::debug!(target = "application::users", purged, "expired sessions removed");
        }

        self.sessions
            .create_session(CreateSessionParams {
                user_id: user.id,
                prefix,
                hashed_secret: hash_secret(&secret),
                expires_at: now + ttl,
            })
            .await?;

        Ok(IssuedSession {
            id: user.id,
            name: user.name,
            email: user.email,
            token,
        })
    }
}

fn duplicate_as_exists(err: RepoError) -> UserError {
    match err {
        RepoError::Duplicate { .. } => UserError::AlreadyExists,
        other => UserError::Repo(other),
    }
}

/// bcrypt hash of `password`, computed on the blocking pool.
pub async fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    let password = password.to_string();
    let hashed =
        tokio::task::spawn_blocking(move || bcrypt::hash(password, PASSWORD_COST)).await??;
    Ok(hashed)
}

/// A malformed stored hash verifies as a mismatch.
pub async fn verify_password(password: &str, stored: &str) -> bool {
    let password = password.to_string();
    let stored = stored.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &stored))
        .await
        .ok()
        .and_then(Result::ok)
        .unwrap_or(false)
}

fn hash_secret(secret: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.finalize().to_vec()
}

fn generate_prefix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

fn generate_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

struct ParsedToken {
    prefix: String,
    secret: String,
}

fn parse_token(token: &str) -> Option<ParsedToken> {
    let mut parts = token.trim().splitn(3, '_');
    if parts.next()? != TOKEN_PREFIX {
        return None;
    }
    let prefix = parts.next()?;
    let secret = parts.next()?;
    if prefix.is_empty() || secret.len() < MIN_SECRET_LEN {
        return None;
    }
    Some(ParsedToken {
        prefix: prefix.to_string(),
        secret: secret.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::InMemoryRepositories;

    const WEEK: Duration = Duration::from_secs(7 * 24 * 3600);

    fn service() -> UserService {
        let repos = Arc::new(InMemoryRepositories::new());
        UserService::new(repos.clone(), repos, "admin@example.com", WEEK)
    }

    fn register(email: &str) -> RegisterCommand {
        RegisterCommand {
            name: "Jane".into(),
            email: email.into(),
            password: "secret1".into(),
        }
    }

    #[tokio::test]
    async fn password_hashes_are_salted_bcrypt() {
        let first = hash_password("hunter22").await.expect("hash");
        let second = hash_password("hunter22").await.expect("hash");
        assert!(first.starts_with("$2b$10$"));
        assert_ne!(first, second);
        assert!(verify_password("hunter22", &first).await);
        assert!(!verify_password("hunter23", &first).await);
        assert!(!verify_password("hunter22", "plain-text").await);
    }

    #[test]
    fn malformed_tokens_are_rejected_before_lookup() {
        assert!(parse_token("").is_none());
        assert!(parse_token("sk_abc_0123456789abcdef0123456789abcdef").is_none());
        assert!(parse_token("pt__0123456789abcdef0123456789abcdef").is_none());
        assert!(parse_token("pt_abc_short").is_none());
        assert!(parse_token("pt_abc_0123456789abcdef0123456789abcdef").is_some());
    }

    #[tokio::test]
    async fn register_then_authenticate_round_trip() {
        let service = service();
        let issued = service
            .register(register("Jane@Example.com"))
            .await
            .expect("registered");
        assert_eq!(issued.email, "jane@example.com");

        let user = service.authenticate(&issued.token).await.expect("valid");
        assert_eq!(user.id, issued.id);
        assert!(!service.is_admin(&user));
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let service = service();
        service
            .register(register("jane@example.com"))
            .await
            .expect("first");
        let err = service
            .register(register("JANE@example.com"))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, UserError::AlreadyExists));
    }

    #[tokio::test]
    async fn login_with_wrong_password_fails() {
        let service = service();
        service
            .register(register("jane@example.com"))
            .await
            .expect("registered");

        let err = service
            .login(LoginCommand {
                email: "jane@example.com".into(),
                password: "wrong-password".into(),
            })
            .await
            .expect_err("bad password");
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn tampered_secret_fails_authentication() {
        let service = service();
        let issued = service
            .register(register("jane@example.com"))
            .await
            .expect("registered");

        let mut tampered = issued.token.clone();
        tampered.pop();
        tampered.push('x');
        assert!(matches!(
            service.authenticate(&tampered).await,
            Err(AuthError::Invalid)
        ));
    }

    #[tokio::test]
    async fn update_profile_keeps_blank_fields() {
        let service = service();
        let issued = service
            .register(register("jane@example.com"))
            .await
            .expect("registered");

        let updated = service
            .update_profile(
                issued.id,
                UpdateProfileCommand {
                    name: Some("Jane Doe".into()),
                    email: Some("".into()),
                    password: None,
                },
            )
            .await
            .expect("updated");

        assert_eq!(updated.name, "Jane Doe");
        assert_eq!(updated.email, "jane@example.com");
        assert_ne!(updated.token, issued.token);

        service
            .login(LoginCommand {
                email: "jane@example.com".into(),
                password: "secret1".into(),
            })
            .await
            .expect("password unchanged");
    }

    #[tokio::test]
    async fn admin_is_recognised_by_configured_email() {
        let service = service();
        let issued = service
            .register(register("Admin@Example.com"))
            .await
            .expect("registered");
        let user = service.authenticate(&issued.token).await.expect("valid");
        assert!(service.require_admin(&user).is_ok());
    }

    #[tokio::test]
    async fn issuing_a_session_purges_expired_ones() {
        let repos = Arc::new(InMemoryRepositories::new());
        let service = UserService::new(
            repos.clone(),
            repos.clone(),
            "admin@example.com",
            Duration::ZERO,
        );
        let first = service
            .register(register("jane@example.com"))
            .await
            .expect("registered");
        let stale = parse_token(&first.token).expect("token").prefix;
        assert!(
            repos
                .find_session_by_prefix(&stale)
                .await
                .expect("lookup")
                .is_some()
        );
        assert!(matches!(
            service.authenticate(&first.token).await,
            Err(AuthError::Invalid)
        ));

        service
            .login(LoginCommand {
                email: "jane@example.com".into(),
                password: "secret1".into(),
            })
            .await
            .expect("login");
        assert!(
            repos
                .find_session_by_prefix(&stale)
                .await
                .expect("lookup")
                .is_none()
        );
    }
}
