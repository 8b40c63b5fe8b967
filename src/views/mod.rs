//! View models for the messaging screens. They hold selection and draft state,
//! read through [`crate::client::MessageQueries`], and expose plain render data.

pub mod badge;
pub mod conversation_list;
pub mod format;
pub mod message_box;
pub mod thread;

pub use badge::NotificationBadge;
pub use conversation_list::MessagesPage;
pub use message_box::MessageBox;
pub use thread::ConversationView;

use crate::api::schemas::messaging::UserSummary;
use uuid::Uuid;

pub const DEFAULT_AVATAR: &str = "/avatar.png";

/// The user whose thread is shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Counterpart {
    pub id: Uuid,
    pub name: String,
    pub profile_picture: Option<String>,
}

impl Counterpart {
    #[must_use]
    pub fn avatar_url(&self) -> &str {
        avatar_url(self.profile_picture.as_deref())
    }
}

impl From<&UserSummary> for Counterpart {
    fn from(user: &UserSummary) -> Self {
        Self { id: user.id, name: user.name.clone(), profile_picture: user.profile_picture.clone() }
    }
}

#[must_use]
pub fn avatar_url(profile_picture: Option<&str>) -> &str {
    profile_picture.filter(|url| !url.is_empty()).unwrap_or(DEFAULT_AVATAR)
}
