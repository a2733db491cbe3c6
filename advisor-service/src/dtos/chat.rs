use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::UserInfo;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserInfoRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone cannot be empty"))]
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub message: String,
    #[validate(nested)]
    pub user_info: UserInfoRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl From<UserInfoRequest> for UserInfo {
    fn from(req: UserInfoRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            phone: req.phone,
        }
    }
}
