use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A client check-in, written once and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusCheck {
    pub id: String,
    pub client_name: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl StatusCheck {
    pub fn new(client_name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            client_name,
            timestamp: Utc::now(),
        }
    }
}
