use crate::domain::message::{Message, NewMessage};
use crate::domain::user::UserSummary;
use crate::error::{AppError, Result};
use crate::services::store::{MessageStore, UserDirectory};
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory message store and user directory for tests and local development.
///
/// Mirrors the Postgres adapter's behavior: inserts referencing unknown users fail with
/// `AppError::NotFound`, and reads use the same ordering.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, UserSummary>,
    messages: RwLock<Vec<Message>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a user profile.
    pub fn upsert_user(&self, user: UserSummary) {
        self.users.insert(user.id, user);
    }

    /// Total number of stored messages.
    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert(&self, message: NewMessage) -> Result<Message> {
        if !self.users.contains_key(&message.sender_id) || !self.users.contains_key(&message.recipient_id) {
            return Err(AppError::NotFound);
        }

        let message = message.into_message();
        self.messages.write().await.push(message.clone());
        Ok(message)
    }

    async fn find_involving(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let messages = self.messages.read().await;
        let mut found: Vec<Message> =
            messages.iter().filter(|m| m.sender_id == user_id || m.recipient_id == user_id).cloned().collect();
        found.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(found)
    }

    async fn find_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>> {
        let messages = self.messages.read().await;
        let mut found: Vec<Message> = messages.iter().filter(|m| m.is_between(a, b)).cloned().collect();
        found.sort_by_key(|m| (m.created_at, m.id));
        Ok(found)
    }

    async fn count_unread(&self, recipient_id: Uuid) -> Result<u64> {
        let messages = self.messages.read().await;
        Ok(messages.iter().filter(|m| m.is_unread_by(recipient_id)).count() as u64)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>> {
        Ok(ids.iter().filter_map(|id| self.users.get(id).map(|user| user.value().clone())).collect())
    }
}
