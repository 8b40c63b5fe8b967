use crate::api::schemas::messaging::Message;
use crate::client::{ClientError, MessageQueries, Poller};
use crate::views::Counterpart;
use crate::views::thread::{Bubble, bubbles};
use std::time::Duration;
use time::OffsetDateTime;

/// Floating chat box opened from a profile. While open it refetches the thread
/// on a fixed interval; closing or dropping it stops the polling.
#[derive(Debug)]
pub struct MessageBox {
    queries: MessageQueries,
    recipient: Counterpart,
    poll_interval: Duration,
    draft: String,
    poller: Option<Poller>,
}

impl MessageBox {
    #[must_use]
    pub const fn new(queries: MessageQueries, recipient: Counterpart, poll_interval: Duration) -> Self {
        Self { queries, recipient, poll_interval, draft: String::new(), poller: None }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.recipient.name
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.poller.is_some()
    }

    /// Starts polling the thread. Opening an already open box does nothing.
    pub fn open(&mut self) {
        if self.poller.is_some() {
            return;
        }

        let queries = self.queries.clone();
        let recipient_id = self.recipient.id;
        self.poller = Some(Poller::start("message_box", self.poll_interval, move || {
            let queries = queries.clone();
            async move {
                if let Err(e) = queries.refetch_thread(recipient_id).await {
                    tracing::warn!(error = %e, "Failed to refresh message box thread");
                }
            }
        }));
    }

    /// Stops polling without waiting on a refetch already in flight.
    pub fn close(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
    }

    /// Bubbles from the last fetched thread; empty until the first poll lands.
    #[must_use]
    pub fn messages(&self, now: OffsetDateTime) -> Vec<Bubble> {
        self.queries.cached_thread(self.recipient.id).map(|t| bubbles(&t, self.recipient.id, now)).unwrap_or_default()
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Sends the draft and refreshes the thread. Blank drafts are ignored.
    ///
    /// # Errors
    /// Returns the client error from the send or the follow-up refetch.
    pub async fn submit(&mut self) -> Result<Option<Message>, ClientError> {
        if self.draft.trim().is_empty() {
            return Ok(None);
        }

        let message = self.queries.send(self.recipient.id, &self.draft).await?;
        self.draft.clear();
        self.queries.refetch_thread(self.recipient.id).await?;
        Ok(Some(message))
    }
}
