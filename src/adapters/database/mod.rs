pub mod message_repo;
pub mod records;
pub mod user_repo;

use crate::config::DatabaseConfig;
use crate::domain::message::{Message, NewMessage};
use crate::domain::user::UserSummary;
use crate::error::Result;
use crate::services::store::{MessageStore, UserDirectory};
use async_trait::async_trait;
use message_repo::MessageRepository;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use user_repo::UserRepository;
use uuid::Uuid;

pub type DbPool = Pool<Postgres>;

/// Initializes the database connection pool.
///
/// # Errors
/// Returns `sqlx::Error` if the connection fails.
pub async fn init_pool(config: &DatabaseConfig) -> std::result::Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await
}

/// Postgres-backed message store and user directory.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: DbPool,
    messages: MessageRepository,
    users: UserRepository,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool, messages: MessageRepository::new(), users: UserRepository::new() }
    }
}

#[async_trait]
impl MessageStore for PgStore {
    async fn insert(&self, message: NewMessage) -> Result<Message> {
        let mut conn = self.pool.acquire().await?;
        self.messages.create(&mut conn, message).await
    }

    async fn find_involving(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let mut conn = self.pool.acquire().await?;
        self.messages.fetch_involving(&mut conn, user_id).await
    }

    async fn find_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>> {
        let mut conn = self.pool.acquire().await?;
        self.messages.fetch_between(&mut conn, a, b).await
    }

    async fn count_unread(&self, recipient_id: Uuid) -> Result<u64> {
        let mut conn = self.pool.acquire().await?;
        self.messages.count_unread(&mut conn, recipient_id).await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>> {
        let mut conn = self.pool.acquire().await?;
        self.users.find_summaries(&mut conn, ids).await
    }
}
