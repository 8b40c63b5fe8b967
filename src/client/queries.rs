use crate::api::schemas::messaging::{Conversation, Message};
use crate::client::cache::{QueryCache, QueryData, QueryKey};
use crate::client::{ClientError, MessagingClient};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Cached reads and cache-invalidating writes over [`MessagingClient`].
#[derive(Clone, Debug)]
pub struct MessageQueries {
    client: MessagingClient,
    cache: Arc<QueryCache>,
}

impl MessageQueries {
    #[must_use]
    pub fn new(client: MessagingClient, stale_after: Duration) -> Self {
        Self { client, cache: Arc::new(QueryCache::new(stale_after)) }
    }

    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Conversation list, served from cache while fresh.
    ///
    /// # Errors
    /// Returns the client error if a refetch was needed and failed.
    pub async fn conversations(&self) -> Result<Vec<Conversation>, ClientError> {
        if let Some(QueryData::Conversations(cached)) = self.cache.fresh(QueryKey::Conversations) {
            return Ok(cached);
        }
        self.refetch_conversations().await
    }

    /// Thread with `user_id`, served from cache while fresh.
    ///
    /// # Errors
    /// Returns the client error if a refetch was needed and failed.
    pub async fn thread(&self, user_id: Uuid) -> Result<Vec<Message>, ClientError> {
        if let Some(QueryData::Thread(cached)) = self.cache.fresh(QueryKey::Thread(user_id)) {
            return Ok(cached);
        }
        self.refetch_thread(user_id).await
    }

    /// Unread badge count, served from cache while fresh.
    ///
    /// # Errors
    /// Returns the client error if a refetch was needed and failed.
    pub async fn unread_count(&self) -> Result<u64, ClientError> {
        if let Some(QueryData::UnreadCount(cached)) = self.cache.fresh(QueryKey::UnreadCount) {
            return Ok(cached);
        }
        self.refetch_unread_count().await
    }

    /// Fetches and caches the conversation list. A response that started
    /// before an invalidation is returned but not cached.
    ///
    /// # Errors
    /// Returns the client error; the cached value is left untouched.
    pub async fn refetch_conversations(&self) -> Result<Vec<Conversation>, ClientError> {
        let generation = self.cache.generation(QueryKey::Conversations);
        let conversations = self.client.list_conversations().await?;
        self.cache.put_fetched(QueryKey::Conversations, generation, QueryData::Conversations(conversations.clone()));
        Ok(conversations)
    }

    /// # Errors
    /// Returns the client error; the cached value is left untouched.
    pub async fn refetch_thread(&self, user_id: Uuid) -> Result<Vec<Message>, ClientError> {
        let generation = self.cache.generation(QueryKey::Thread(user_id));
        let thread = self.client.list_thread(user_id).await?;
        self.cache.put_fetched(QueryKey::Thread(user_id), generation, QueryData::Thread(thread.clone()));
        Ok(thread)
    }

    /// # Errors
    /// Returns the client error; the cached value is left untouched.
    pub async fn refetch_unread_count(&self) -> Result<u64, ClientError> {
        let generation = self.cache.generation(QueryKey::UnreadCount);
        let count = self.client.unread_count().await?;
        self.cache.put_fetched(QueryKey::UnreadCount, generation, QueryData::UnreadCount(count));
        Ok(count)
    }

    /// Last known conversation list without touching the network.
    #[must_use]
    pub fn cached_conversations(&self) -> Option<Vec<Conversation>> {
        match self.cache.get(QueryKey::Conversations) {
            Some(QueryData::Conversations(conversations)) => Some(conversations),
            _ => None,
        }
    }

    #[must_use]
    pub fn cached_thread(&self, user_id: Uuid) -> Option<Vec<Message>> {
        match self.cache.get(QueryKey::Thread(user_id)) {
            Some(QueryData::Thread(thread)) => Some(thread),
            _ => None,
        }
    }

    #[must_use]
    pub fn cached_unread_count(&self) -> Option<u64> {
        match self.cache.get(QueryKey::UnreadCount) {
            Some(QueryData::UnreadCount(count)) => Some(count),
            _ => None,
        }
    }

    /// Sends a message, then drops the cached thread and conversation list so
    /// the next read reflects it.
    ///
    /// # Errors
    /// Returns the client error; the cache is not invalidated on failure.
    #[tracing::instrument(skip(self, content), err(level = "warn"))]
    pub async fn send(&self, recipient_id: Uuid, content: &str) -> Result<Message, ClientError> {
        let message = self.client.send_message(recipient_id, content).await?;
        self.cache.invalidate(QueryKey::Thread(recipient_id));
        self.cache.invalidate(QueryKey::Conversations);
        Ok(message)
    }
}
