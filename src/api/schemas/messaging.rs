use crate::domain::conversation::Conversation as DomainConversation;
use crate::domain::message::{ExpandedMessage, MessageContent};
use crate::domain::user::UserSummary as DomainUserSummary;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Body of `POST /messages`. Fields are optional so a missing field is reported as a validation error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub recipient_id: Option<Uuid>,
    pub content: Option<String>,
}

impl SendMessage {
    #[must_use]
    pub fn new(recipient_id: Uuid, content: impl Into<String>) -> Self {
        Self { recipient_id: Some(recipient_id), content: Some(content.into()) }
    }

    /// Checks that both fields are present and the content is not blank.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` naming the first invalid field.
    pub fn validate(self) -> Result<(Uuid, MessageContent), AppError> {
        let recipient_id =
            self.recipient_id.ok_or_else(|| AppError::BadRequest("recipientId is required".to_string()))?;
        let content = self.content.ok_or_else(|| AppError::BadRequest("content is required".to_string()))?;
        Ok((recipient_id, MessageContent::try_from(content)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender: UserSummary,
    pub recipient: UserSummary,
    pub content: String,
    pub read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub user: UserSummary,
    pub last_message: Message,
    pub unread_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl From<DomainUserSummary> for UserSummary {
    fn from(user: DomainUserSummary) -> Self {
        Self { id: user.id, name: user.name, username: user.username, profile_picture: user.profile_picture }
    }
}

impl From<ExpandedMessage> for Message {
    fn from(expanded: ExpandedMessage) -> Self {
        Self {
            id: expanded.message.id,
            sender: expanded.sender.into(),
            recipient: expanded.recipient.into(),
            content: expanded.message.content,
            read: expanded.message.read,
            created_at: expanded.message.created_at,
        }
    }
}

impl From<DomainConversation> for Conversation {
    fn from(conversation: DomainConversation) -> Self {
        Self {
            user: conversation.user.into(),
            last_message: conversation.last_message.into(),
            unread_count: conversation.unread_count,
        }
    }
}
