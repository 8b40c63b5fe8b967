use crate::api::schemas::messaging::Message;
use crate::client::{ClientError, MessageQueries};
use crate::views::Counterpart;
use crate::views::format::relative_time;
use time::OffsetDateTime;
use uuid::Uuid;

pub const NO_SELECTION_TEXT: &str = "Select a conversation to start messaging";
pub const EMPTY_THREAD_TEXT: &str = "No messages yet. Start the conversation!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Sent by the counterpart
    Left,
    /// Sent by the viewer
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bubble {
    pub id: Uuid,
    pub content: String,
    pub side: Side,
    pub time_label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ThreadState {
    NoSelection,
    Loading,
    Empty,
    Ready(Vec<Bubble>),
}

/// Lays out a thread as bubbles, counterpart on the left.
#[must_use]
pub fn bubbles(thread: &[Message], counterpart_id: Uuid, now: OffsetDateTime) -> Vec<Bubble> {
    thread
        .iter()
        .map(|message| Bubble {
            id: message.id,
            content: message.content.clone(),
            side: if message.sender.id == counterpart_id { Side::Left } else { Side::Right },
            time_label: relative_time(message.created_at, now),
        })
        .collect()
}

/// Thread detail pane for the selected counterpart, with a draft box.
#[derive(Debug)]
pub struct ConversationView {
    queries: MessageQueries,
    counterpart: Option<Counterpart>,
    draft: String,
}

impl ConversationView {
    #[must_use]
    pub fn new(queries: MessageQueries, counterpart: Option<Counterpart>) -> Self {
        Self { queries, counterpart, draft: String::new() }
    }

    #[must_use]
    pub const fn counterpart(&self) -> Option<&Counterpart> {
        self.counterpart.as_ref()
    }

    /// Fetches the thread unless one is already cached and fresh. No-op without a selection.
    ///
    /// # Errors
    /// Returns the client error if the fetch fails.
    pub async fn load(&self) -> Result<(), ClientError> {
        if let Some(counterpart) = &self.counterpart {
            self.queries.thread(counterpart.id).await?;
        }
        Ok(())
    }

    #[must_use]
    pub fn state(&self, now: OffsetDateTime) -> ThreadState {
        let Some(counterpart) = &self.counterpart else {
            return ThreadState::NoSelection;
        };
        match self.queries.cached_thread(counterpart.id) {
            None => ThreadState::Loading,
            Some(thread) if thread.is_empty() => ThreadState::Empty,
            Some(thread) => ThreadState::Ready(bubbles(&thread, counterpart.id, now)),
        }
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.counterpart.is_some() && !self.draft.trim().is_empty()
    }

    /// Sends the draft and refreshes the thread. Blank drafts are ignored and
    /// return `Ok(None)`. The draft is kept if sending fails or the call is
    /// dropped before the send completes.
    ///
    /// # Errors
    /// Returns the client error from the send or the follow-up refetch.
    pub async fn submit(&mut self) -> Result<Option<Message>, ClientError> {
        if !self.can_submit() {
            return Ok(None);
        }
        let Some(recipient_id) = self.counterpart.as_ref().map(|c| c.id) else {
            return Ok(None);
        };

        let message = self.queries.send(recipient_id, &self.draft).await?;
        self.draft.clear();
        self.queries.refetch_thread(recipient_id).await?;
        Ok(Some(message))
    }
}
