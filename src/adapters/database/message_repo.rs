use crate::adapters::database::records::MessageRecord;
use crate::domain::message::{Message, NewMessage};
use crate::error::{AppError, Result};
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct MessageRepository {}

impl MessageRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Records a new message in the database.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if a participant does not exist.
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, message), fields(message_id = %message.id))]
    pub(crate) async fn create(&self, conn: &mut PgConnection, message: NewMessage) -> Result<Message> {
        let result = sqlx::query_as::<_, MessageRecord>(
            r"
            INSERT INTO messages (id, sender_id, recipient_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, sender_id, recipient_id, content, read, created_at
            ",
        )
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(message.content.into_inner())
        .bind(message.created_at)
        .fetch_one(conn)
        .await;

        match result {
            Ok(record) => Ok(record.into()),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23503") => {
                // Foreign key violation: sender or recipient does not exist
                Err(AppError::NotFound)
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// Fetches every message a user sent or received, newest first.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn fetch_involving(&self, conn: &mut PgConnection, user_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, MessageRecord>(
            r"
            SELECT id, sender_id, recipient_id, content, read, created_at
            FROM messages
            WHERE sender_id = $1 OR recipient_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(messages.into_iter().map(Into::into).collect())
    }

    /// Fetches the thread between two users, oldest first.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn fetch_between(&self, conn: &mut PgConnection, a: Uuid, b: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, MessageRecord>(
            r"
            SELECT id, sender_id, recipient_id, content, read, created_at
            FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(a)
        .bind(b)
        .fetch_all(conn)
        .await?;

        Ok(messages.into_iter().map(Into::into).collect())
    }

    /// Counts unread messages addressed to a user.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn count_unread(&self, conn: &mut PgConnection, recipient_id: Uuid) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND read = FALSE")
            .bind(recipient_id)
            .fetch_one(conn)
            .await?;

        Ok(count.unsigned_abs())
    }
}
