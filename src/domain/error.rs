use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("identifier prefix `{prefix}` is invalid: {reason}")]
    InvalidIdPrefix { prefix: String, reason: &'static str },
}

impl DomainError {
    pub fn invalid_id_prefix(prefix: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidIdPrefix {
            prefix: prefix.into(),
            reason,
        }
    }
}
