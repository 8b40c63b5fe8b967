use crate::domain::user::UserSummary;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct UserRecord {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) username: String,
    pub(crate) profile_picture: Option<String>,
}

impl From<UserRecord> for UserSummary {
    fn from(record: UserRecord) -> Self {
        Self { id: record.id, name: record.name, username: record.username, profile_picture: record.profile_picture }
    }
}
