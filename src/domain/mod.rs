//! Domain layer types and invariants.

pub mod credential;
pub mod error;
pub mod ids;
pub mod slides;
