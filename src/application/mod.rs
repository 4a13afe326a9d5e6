//! Application services: the Markdown-to-batch pipeline and the flows that
//! drive the Google collaborators.

pub mod assemble;
pub mod auth;
pub mod builder;
pub mod convert;
pub mod error;
pub mod ports;
pub mod segment;
pub mod sessions;
pub mod tokens;
