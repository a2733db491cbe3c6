//! Records written by the chat flow: the inbound message and the reply.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contact details supplied with every chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// The user's message, persisted before the model is called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageRecord {
    pub id: String,
    pub user_info: UserInfo,
    pub message: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

/// The advisor's reply. `user_id` points at [`ChatMessageRecord::id`]; nothing
/// enforces that the referenced record still exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiResponseRecord {
    pub id: String,
    pub user_id: String,
    pub response: String,
    pub recommendations: Vec<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessageRecord {
    pub fn new(user_info: UserInfo, message: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_info,
            message,
            timestamp: Utc::now(),
        }
    }
}

impl AiResponseRecord {
    pub fn new(user_id: String, response: String, recommendations: Vec<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            response,
            recommendations,
            timestamp: Utc::now(),
        }
    }
}
