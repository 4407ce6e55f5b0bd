use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::identity::Registered;
use crate::domain::entities::{AuthorRecord, SubscriptionRecord};
use crate::domain::error::DomainError;
use crate::domain::types::parse_flag;

#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub username: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

impl From<Registered> for RegisterResponse {
    fn from(registered: Registered) -> Self {
        Self {
            id: registered.user.id,
            username: registered.user.username,
            token: registered.token,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostCreateRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SubscribeRequest {
    /// Username of the author to follow.
    pub author: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UnsubscribeRequest {
    pub author: Uuid,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SubscriptionResponse {
    pub author: Uuid,
    pub subscriber: Uuid,
}

impl From<SubscriptionRecord> for SubscriptionResponse {
    fn from(edge: SubscriptionRecord) -> Self {
        Self {
            author: edge.author_id,
            subscriber: edge.subscriber_id,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub author: String,
    pub count_post: u64,
}

impl From<AuthorRecord> for AuthorResponse {
    fn from(author: AuthorRecord) -> Self {
        Self {
            id: author.id,
            author: author.username,
            count_post: author.post_count,
        }
    }
}

/// `is_read` as clients send it: a JSON boolean, `0`/`1`, or a string
/// such as `"true"` or `"0"`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl FlagValue {
    pub fn parse(&self, field: &'static str) -> Result<bool, DomainError> {
        match self {
            Self::Bool(value) => Ok(*value),
            Self::Number(1) => Ok(true),
            Self::Number(0) => Ok(false),
            Self::Number(other) => Err(DomainError::validation(
                field,
                format!("expected 0 or 1, got {other}"),
            )),
            Self::Text(raw) => parse_flag(raw, field),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReadStateRequest {
    pub is_read: Option<FlagValue>,
}
