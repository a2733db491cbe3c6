//! Persisted records for the advisor service.

pub mod chat;
pub mod status_check;

pub use chat::{AiResponseRecord, ChatMessageRecord, UserInfo};
pub use status_check::StatusCheck;
