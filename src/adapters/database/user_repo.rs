use crate::adapters::database::records::UserRecord;
use crate::domain::user::UserSummary;
use crate::error::Result;
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct UserRepository {}

impl UserRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Fetches the public profile of every listed user that exists.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn, ids), fields(count = ids.len()))]
    pub(crate) async fn find_summaries(&self, conn: &mut PgConnection, ids: &[Uuid]) -> Result<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserRecord>(
            r"
            SELECT id, name, username, profile_picture
            FROM users
            WHERE id = ANY($1)
            ",
        )
        .bind(ids)
        .fetch_all(conn)
        .await?;

        Ok(users.into_iter().map(Into::into).collect())
    }
}
