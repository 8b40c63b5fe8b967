pub mod message;
pub mod user;

pub use message::MessageRecord;
pub use user::UserRecord;
