use crate::domain::conversation::{self, Conversation};
use crate::domain::message::{ExpandedMessage, Message, MessageContent, NewMessage, participant_ids};
use crate::domain::user::UserSummary;
use crate::error::{AppError, Result};
use crate::services::store::{MessageStore, UserDirectory};
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    sent_total: Counter<u64>,
    conversations_listed: Histogram<u64>,
    thread_size: Histogram<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("proconnect-messaging");
        Self {
            sent_total: meter
                .u64_counter("proconnect_messages_sent_total")
                .with_description("Total send attempts by outcome")
                .build(),
            conversations_listed: meter
                .u64_histogram("proconnect_conversations_listed")
                .with_description("Number of conversations returned per list request")
                .build(),
            thread_size: meter
                .u64_histogram("proconnect_thread_size")
                .with_description("Number of messages returned per thread request")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MessageService {
    messages: Arc<dyn MessageStore>,
    users: Arc<dyn UserDirectory>,
    metrics: Metrics,
}

impl MessageService {
    #[must_use]
    pub fn new(messages: Arc<dyn MessageStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { messages, users, metrics: Metrics::new() }
    }

    /// Sends a message and returns it with both participants expanded.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the recipient does not exist.
    /// Returns `AppError::Database` if the message cannot be stored.
    #[tracing::instrument(err(level = "warn"), skip(self, content))]
    pub async fn send_message(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        content: MessageContent,
    ) -> Result<ExpandedMessage> {
        let stored = match self.messages.insert(NewMessage::new(sender_id, recipient_id, content)).await {
            Ok(message) => {
                self.metrics.sent_total.add(1, &[KeyValue::new("status", "success")]);
                message
            }
            Err(e) => {
                self.metrics.sent_total.add(1, &[KeyValue::new("status", "failure")]);
                return Err(e);
            }
        };

        tracing::debug!(message_id = %stored.id, "Message stored");

        self.expand(vec![stored]).await?.pop().ok_or(AppError::Internal)
    }

    /// Lists one conversation per counterpart, most recent first.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the history or user lookup fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn list_conversations(&self, viewer_id: Uuid) -> Result<Vec<Conversation>> {
        let history = self.messages.find_involving(viewer_id).await?;
        let summaries = conversation::aggregate(viewer_id, history);

        let users = self.lookup(&participant_ids(summaries.iter().map(|s| &s.last_message))).await?;

        let conversations: Vec<Conversation> = summaries
            .into_iter()
            .filter_map(|summary| {
                let counterpart_id = summary.counterpart_id;
                let resolved = Conversation::resolve(summary, &users);
                if resolved.is_none() {
                    tracing::warn!(%counterpart_id, "Skipping conversation with unknown participant");
                }
                resolved
            })
            .collect();

        self.metrics.conversations_listed.record(conversations.len() as u64, &[]);
        Ok(conversations)
    }

    /// Lists the thread between the viewer and another user, oldest first.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query or user lookup fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn list_thread(&self, viewer_id: Uuid, other_user_id: Uuid) -> Result<Vec<ExpandedMessage>> {
        let thread = self.messages.find_between(viewer_id, other_user_id).await?;
        let expanded = self.expand(thread).await?;

        self.metrics.thread_size.record(expanded.len() as u64, &[]);
        Ok(expanded)
    }

    /// Counts every unread message addressed to the viewer.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn unread_count(&self, viewer_id: Uuid) -> Result<u64> {
        self.messages.count_unread(viewer_id).await
    }

    async fn expand(&self, messages: Vec<Message>) -> Result<Vec<ExpandedMessage>> {
        let users = self.lookup(&participant_ids(&messages)).await?;

        Ok(messages
            .into_iter()
            .filter_map(|message| {
                let message_id = message.id;
                let expanded = ExpandedMessage::attach(message, &users);
                if expanded.is_none() {
                    tracing::warn!(%message_id, "Skipping message with unknown participant");
                }
                expanded
            })
            .collect())
    }

    async fn lookup(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let summaries = self.users.find_summaries(ids).await?;
        Ok(summaries.into_iter().map(|user| (user.id, user)).collect())
    }
}
