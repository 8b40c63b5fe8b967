//! Persistence seams for the messaging services.

use crate::domain::message::{Message, NewMessage};
use crate::domain::user::UserSummary;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use uuid::Uuid;

#[async_trait]
pub trait MessageStore: Send + Sync + Debug {
    /// Persists a new message in a single write.
    ///
    /// Returns `AppError::NotFound` if either participant does not exist.
    async fn insert(&self, message: NewMessage) -> Result<Message>;

    /// Every message the user sent or received, newest first.
    async fn find_involving(&self, user_id: Uuid) -> Result<Vec<Message>>;

    /// Every message exchanged between exactly `a` and `b`, oldest first.
    async fn find_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>>;

    /// Number of unread messages addressed to `recipient_id`.
    async fn count_unread(&self, recipient_id: Uuid) -> Result<u64>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<()>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync + Debug {
    /// Batch lookup of public profiles. Unknown ids are omitted from the result.
    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>>;
}
