//! Object identifiers for generated slides and shapes.
//!
//! Google Slides accepts caller-chosen object ids between 5 and 50 characters
//! that start with a word character and continue with word characters, `-` or
//! `:`. Every id handed out by an [`IdentifierGenerator`] must be unique within
//! the batch it ends up in.

use uuid::Uuid;

use super::{error::DomainError, slides::ObjectId};

const MAX_PREFIX_LEN: usize = 24;
const RANDOM_PREFIX_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Slide,
    TitleShape,
    BodyShape,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Slide => "slide",
            ObjectKind::TitleShape => "title",
            ObjectKind::BodyShape => "body",
        }
    }
}

/// Source of batch-unique object identifiers.
pub trait IdentifierGenerator {
    fn next_id(&mut self, kind: ObjectKind) -> ObjectId;
}

/// Counter-backed generator producing `{prefix}_{kind}_{n}`.
///
/// The counter is shared across kinds, so two ids from the same generator
/// never collide regardless of how quickly they are requested.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Result<Self, DomainError> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        Ok(Self { prefix, next: 0 })
    }

    /// Generator with a random prefix so ids from separate batches also differ.
    pub fn random() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self {
            prefix: format!("md{}", &simple[..RANDOM_PREFIX_LEN]),
            next: 0,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl IdentifierGenerator for SequentialIds {
    fn next_id(&mut self, kind: ObjectKind) -> ObjectId {
        let n = self.next;
        self.next += 1;
        ObjectId::new(format!("{}_{}_{n}", self.prefix, kind.as_str()))
    }
}

fn validate_prefix(prefix: &str) -> Result<(), DomainError> {
    let Some(first) = prefix.chars().next() else {
        return Err(DomainError::invalid_id_prefix(prefix, "must not be empty"));
    };
    if prefix.len() > MAX_PREFIX_LEN {
        return Err(DomainError::invalid_id_prefix(
            prefix,
            "must be at most 24 characters",
        ));
    }
    if !(first.is_ascii_alphanumeric() || first == '_') {
        return Err(DomainError::invalid_id_prefix(
            prefix,
            "must start with a letter, digit or underscore",
        ));
    }
    if !prefix
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | ':'))
    {
        return Err(DomainError::invalid_id_prefix(
            prefix,
            "may only contain letters, digits, `_`, `-` or `:`",
        ));
    }
    Ok(())
}
