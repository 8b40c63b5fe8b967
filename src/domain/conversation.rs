//! Folding a viewer's flat message history into one summary per counterpart.
//!
//! The unread indicator only looks at the newest message of each conversation:
//! it is 1 when that message is unread and addressed to the viewer, otherwise 0.
//! Older unread messages in the same conversation are not counted.

use crate::domain::message::{ExpandedMessage, Message};
use crate::domain::user::UserSummary;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Per-counterpart summary before user expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub counterpart_id: Uuid,
    pub last_message: Message,
    pub unread_count: u32,
}

/// A conversation list entry with the counterpart and last message expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub user: UserSummary,
    pub last_message: ExpandedMessage,
    pub unread_count: u32,
}

impl Conversation {
    /// Joins a summary against user summaries; `None` if any participant is missing.
    #[must_use]
    pub fn resolve(summary: ConversationSummary, users: &HashMap<Uuid, UserSummary>) -> Option<Self> {
        let user = users.get(&summary.counterpart_id)?.clone();
        let last_message = ExpandedMessage::attach(summary.last_message, users)?;
        Some(Self { user, last_message, unread_count: summary.unread_count })
    }
}

/// Folds a newest-first message list into conversation summaries.
///
/// The first message seen for a counterpart becomes its last message; later ones are skipped.
/// Output keeps first-seen order, so it is newest-first when the input is.
#[must_use]
pub fn aggregate(viewer_id: Uuid, newest_first: impl IntoIterator<Item = Message>) -> Vec<ConversationSummary> {
    let mut seen = HashSet::new();
    let mut conversations = Vec::new();

    for message in newest_first {
        let counterpart_id = message.counterpart_of(viewer_id);
        if !seen.insert(counterpart_id) {
            continue;
        }

        let unread_count = u32::from(message.is_unread_by(viewer_id));
        conversations.push(ConversationSummary { counterpart_id, last_message: message, unread_count });
    }

    conversations
}
