//! Daily RSS newsletter digest.
//!
//! This crate provides:
//! - RSS/Atom polling with a look-back window and per-run cap
//! - A persistent dedup set so each entry is mailed once
//! - Gemini summarization with a model fallback chain
//! - Gmail API delivery using an OAuth refresh token
//! - A safety guard that pins the task, feed and recipient before any send

pub mod config;
pub mod digest;
pub mod error;
pub mod feed;
pub mod guard;
pub mod mail;
pub mod schedule;
pub mod state;
pub mod summarize;
pub mod workflow;

// Re-export main types
pub use config::{ConfigArgs, NewsletterConfig, Secret};
pub use digest::Digest;
pub use error::{NewsletterError, Result};
pub use feed::FeedEntry;
pub use state::{JsonStateStore, SentSet, StateStore};
pub use workflow::{RunOutcome, Workflow};
