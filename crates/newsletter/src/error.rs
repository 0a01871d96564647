//! Error types for the newsletter workflow.

use thiserror::Error;

use crate::guard::GuardField;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NewsletterError>;

/// Errors that can end a newsletter run.
#[derive(Debug, Error)]
pub enum NewsletterError {
    /// The safety guard rejected the configuration; nothing was sent.
    #[error("OAuth token usage is blocked: {field} does not match the allowed value")]
    ConfigMismatch { field: GuardField },

    /// A configuration value could not be interpreted.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Fetching or parsing the feed failed.
    #[error("Feed fetch failed: {0}")]
    Feed(String),

    /// Every summarization model failed.
    #[error("Summarization failed: {0}")]
    Summarize(String),

    /// Exchanging the refresh token for an access token failed.
    #[error("OAuth token refresh failed: {0}")]
    OAuth(String),

    /// Building or sending the email failed.
    #[error("Mail send failed: {0}")]
    Mail(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
