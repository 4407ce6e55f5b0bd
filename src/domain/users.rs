//! Username normalization.

use super::error::DomainError;

pub const MAX_USERNAME_LEN: usize = 150;

pub fn normalize_username(raw: &str) -> Result<String, DomainError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(DomainError::validation("username", "must not be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(DomainError::validation(
            "username",
            format!("must be at most {MAX_USERNAME_LEN} characters"),
        ));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(DomainError::validation(
            "username",
            "must not contain whitespace",
        ));
    }
    Ok(username.to_string())
}
