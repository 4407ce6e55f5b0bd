//! Post input validation.

use super::error::DomainError;

pub const MAX_TITLE_LEN: usize = 255;

/// Validated title and content for a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

impl PostDraft {
    pub fn new(title: &str, content: &str) -> Result<Self, DomainError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("title", "must not be empty"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::validation(
                "title",
                format!("must be at most {MAX_TITLE_LEN} characters"),
            ));
        }
        if content.trim().is_empty() {
            return Err(DomainError::validation("content", "must not be empty"));
        }

        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
        })
    }
}
