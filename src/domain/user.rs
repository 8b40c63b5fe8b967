use uuid::Uuid;

/// The public profile fields a message's sender or recipient expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub profile_picture: Option<String>,
}
