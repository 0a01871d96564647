//! Digest delivery.
//!
//! Mail goes out through the Gmail API using an OAuth refresh token with
//! the `gmail.send` scope.

mod gmail;
mod oauth;

pub use gmail::{encode_raw_message, GmailSender};
pub use oauth::{AccessToken, TokenClient, GMAIL_SEND_SCOPE};

use async_trait::async_trait;

use crate::digest::Digest;
use crate::error::Result;

/// Delivers a composed digest.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, digest: &Digest) -> Result<()>;
}
