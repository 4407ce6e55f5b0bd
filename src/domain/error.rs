use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid `{field}`: {message}")]
    Validation { field: &'static str, message: String },
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}
