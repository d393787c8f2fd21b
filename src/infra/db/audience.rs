//! Newsletter subscribers and contact messages.

use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreateMessageParams, CreateSubscriberParams, MessagesRepo, RepoError, SubscribersRepo,
};
use crate::domain::entities::{MessageRecord, SubscriberRecord};

use super::PostgresRepositories;
use super::util::map_sqlx_error;

const SUBSCRIBER_COLUMNS: &str = "id, email, name, subscribed_at, created_at";
const MESSAGE_COLUMNS: &str = "id, name, email, subject, message, created_at";

#[derive(Debug, FromRow)]
struct SubscriberRow {
    id: Uuid,
    email: String,
    name: Option<String>,
    subscribed_at: OffsetDateTime,
    created_at: OffsetDateTime,
}

impl From<SubscriberRow> for SubscriberRecord {
    fn from(row: SubscriberRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            subscribed_at: row.subscribed_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MessageRow {
    id: Uuid,
    name: String,
    email: String,
    subject: String,
    message: String,
    created_at: OffsetDateTime,
}

impl From<MessageRow> for MessageRecord {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl SubscribersRepo for PostgresRepositories {
    async fn create_subscriber(
        &self,
        params: CreateSubscriberParams,
    ) -> Result<SubscriberRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, SubscriberRow>(&format!(
            "INSERT INTO subscribers (id, email, name, subscribed_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4, $4) RETURNING {SUBSCRIBER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(params.email)
        .bind(params.name)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn list_subscribers(&self) -> Result<Vec<SubscriberRecord>, RepoError> {
        let rows = sqlx::query_as::<_, SubscriberRow>(&format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM subscribers ORDER BY subscribed_at DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(SubscriberRecord::from).collect())
    }
}

#[async_trait]
impl MessagesRepo for PostgresRepositories {
    async fn create_message(
        &self,
        params: CreateMessageParams,
    ) -> Result<MessageRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "INSERT INTO messages (id, name, email, subject, message, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(params.name)
        .bind(params.email)
        .bind(params.subject)
        .bind(params.message)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn list_messages(&self, limit: Option<usize>) -> Result<Vec<MessageRecord>, RepoError> {
        // NULL limit means no limit in Postgres.
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit.map(Self::convert_limit))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(MessageRecord::from).collect())
    }
}
