use crate::api::schemas::messaging::Conversation;
use crate::client::{ClientError, MessageQueries};
use crate::views::format::relative_time;
use crate::views::thread::ConversationView;
use crate::views::{Counterpart, avatar_url};
use time::OffsetDateTime;
use uuid::Uuid;

pub const EMPTY_LIST_TEXT: &str = "No conversations yet. Connect with people to start messaging.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationRow {
    pub user_id: Uuid,
    pub name: String,
    pub avatar_url: String,
    pub preview: String,
    pub time_label: String,
    /// Hidden when zero
    pub unread_badge: Option<u32>,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListState {
    Loading,
    Empty,
    Ready(Vec<ConversationRow>),
}

/// Conversation list with the currently selected counterpart.
#[derive(Debug)]
pub struct MessagesPage {
    queries: MessageQueries,
    selected: Option<Counterpart>,
}

impl MessagesPage {
    #[must_use]
    pub const fn new(queries: MessageQueries) -> Self {
        Self { queries, selected: None }
    }

    /// # Errors
    /// Returns the client error if the conversation list cannot be fetched.
    pub async fn load(&self) -> Result<(), ClientError> {
        self.queries.conversations().await.map(|_| ())
    }

    #[must_use]
    pub fn list(&self, now: OffsetDateTime) -> ListState {
        match self.queries.cached_conversations() {
            None => ListState::Loading,
            Some(conversations) if conversations.is_empty() => ListState::Empty,
            Some(conversations) => ListState::Ready(conversations.iter().map(|c| self.row(c, now)).collect()),
        }
    }

    /// Selects the counterpart of a listed conversation. Returns `false` if no
    /// loaded conversation has that user.
    pub fn select(&mut self, user_id: Uuid) -> bool {
        let found = self
            .queries
            .cached_conversations()
            .and_then(|conversations| conversations.iter().find(|c| c.user.id == user_id).map(|c| Counterpart::from(&c.user)));

        match found {
            Some(counterpart) => {
                self.selected = Some(counterpart);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub const fn selected(&self) -> Option<&Counterpart> {
        self.selected.as_ref()
    }

    /// Detail pane for the current selection.
    #[must_use]
    pub fn conversation_view(&self) -> ConversationView {
        ConversationView::new(self.queries.clone(), self.selected.clone())
    }

    fn row(&self, conversation: &Conversation, now: OffsetDateTime) -> ConversationRow {
        ConversationRow {
            user_id: conversation.user.id,
            name: conversation.user.name.clone(),
            avatar_url: avatar_url(conversation.user.profile_picture.as_deref()).to_string(),
            preview: conversation.last_message.content.clone(),
            time_label: relative_time(conversation.last_message.created_at, now),
            unread_badge: (conversation.unread_count > 0).then_some(conversation.unread_count),
            selected: self.selected.as_ref().is_some_and(|s| s.id == conversation.user.id),
        }
    }
}
