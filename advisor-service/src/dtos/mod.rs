//! Request and response bodies for the HTTP API.

pub mod chat;
pub mod status;

pub use chat::{ChatRequest, ChatResponse, UserInfoRequest};
pub use status::{StatusCheckCreate, StatusCheckResponse};
