//! Markdown to Google Slides conversion service.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
