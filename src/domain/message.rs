use crate::domain::user::UserSummary;
use crate::error::AppError;
use std::collections::{HashMap, HashSet};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub read: bool,
    pub created_at: OffsetDateTime,
}

impl Message {
    /// The participant that is not `viewer_id`.
    #[must_use]
    pub fn counterpart_of(&self, viewer_id: Uuid) -> Uuid {
        if self.sender_id == viewer_id { self.recipient_id } else { self.sender_id }
    }

    #[must_use]
    pub fn is_between(&self, a: Uuid, b: Uuid) -> bool {
        (self.sender_id == a && self.recipient_id == b) || (self.sender_id == b && self.recipient_id == a)
    }

    #[must_use]
    pub fn is_unread_by(&self, viewer_id: Uuid) -> bool {
        self.recipient_id == viewer_id && !self.read
    }
}

/// Message text that has passed creation-time validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest("Message content must not be empty".to_string()));
        }
        Ok(Self(value))
    }
}

/// A message about to be persisted. Identity and timestamp are fixed here so every store orders the same way.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: MessageContent,
    pub created_at: OffsetDateTime,
}

impl NewMessage {
    #[must_use]
    pub fn new(sender_id: Uuid, recipient_id: Uuid, content: MessageContent) -> Self {
        Self { id: Uuid::now_v7(), sender_id, recipient_id, content, created_at: OffsetDateTime::now_utc() }
    }

    #[must_use]
    pub fn into_message(self) -> Message {
        Message {
            id: self.id,
            sender_id: self.sender_id,
            recipient_id: self.recipient_id,
            content: self.content.into_inner(),
            read: false,
            created_at: self.created_at,
        }
    }
}

/// A message with both participants joined in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedMessage {
    pub message: Message,
    pub sender: UserSummary,
    pub recipient: UserSummary,
}

impl ExpandedMessage {
    /// Joins a message against a set of user summaries; `None` if either participant is missing.
    #[must_use]
    pub fn attach(message: Message, users: &HashMap<Uuid, UserSummary>) -> Option<Self> {
        let sender = users.get(&message.sender_id)?.clone();
        let recipient = users.get(&message.recipient_id)?.clone();
        Some(Self { message, sender, recipient })
    }
}

/// Distinct participant ids across a batch of messages, in first-seen order.
#[must_use]
pub fn participant_ids<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for message in messages {
        for id in [message.sender_id, message.recipient_id] {
            if seen.insert(id) {
                ids.push(id);
            }
        }
    }
    ids
}
