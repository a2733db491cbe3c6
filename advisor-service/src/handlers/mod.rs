//! HTTP handlers for advisor-service.

pub mod chat;
pub mod health;
pub mod root;
pub mod status;

pub use chat::chat;
pub use health::{health_check, metrics_endpoint, not_found, readiness_check};
pub use root::root;
pub use status::{create_status_check, list_status_checks};
