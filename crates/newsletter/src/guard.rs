//! Safety guard for credentialed sends.
//!
//! The OAuth token in this deployment may only be used to mail one feed's
//! digest to one recipient. A fork or a misconfigured copy must fail closed
//! before the token is ever exchanged.

use std::fmt;

use crate::config::NewsletterConfig;
use crate::error::{NewsletterError, Result};

/// The protected configuration triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardTarget<'a> {
    /// Task marker that identifies this workflow.
    pub task_name: &'a str,
    /// The only feed this workflow may digest.
    pub feed_url: &'a str,
    /// The only address this workflow may mail.
    pub recipient_email: &'a str,
}

/// The values this deployment is allowed to run with.
pub const EXPECTED_TARGET: GuardTarget<'static> = GuardTarget {
    task_name: "choi_threads_newsletter",
    feed_url: "https://rss.app/feeds/PJfFHato1ox9YKyR.xml",
    recipient_email: "plain9191@gmail.com",
};

/// Which protected field failed the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardField {
    TaskName,
    FeedUrl,
    RecipientEmail,
}

impl GuardField {
    /// Environment variable that carries this field.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::TaskName => "TASK_NAME",
            Self::FeedUrl => "RSS_URL",
            Self::RecipientEmail => "TO_EMAIL",
        }
    }
}

impl fmt::Display for GuardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_var())
    }
}

impl GuardTarget<'_> {
    /// First field that differs from `expected`, in declaration order.
    fn first_mismatch(&self, expected: &GuardTarget<'_>) -> Option<GuardField> {
        if self.task_name != expected.task_name {
            Some(GuardField::TaskName)
        } else if self.feed_url != expected.feed_url {
            Some(GuardField::FeedUrl)
        } else if self.recipient_email != expected.recipient_email {
            Some(GuardField::RecipientEmail)
        } else {
            None
        }
    }
}

/// Validate the configuration against [`EXPECTED_TARGET`].
pub fn check(config: &NewsletterConfig) -> Result<()> {
    check_against(&EXPECTED_TARGET, config)
}

/// Validate the configuration against an explicit target.
///
/// The feed URL is trimmed and the recipient is trimmed and lower-cased
/// before comparison; the task name must match exactly.
pub fn check_against(expected: &GuardTarget<'_>, config: &NewsletterConfig) -> Result<()> {
    let recipient = config.recipient_email.trim().to_lowercase();
    let actual = GuardTarget {
        task_name: &config.task_name,
        feed_url: config.feed_url.trim(),
        recipient_email: &recipient,
    };

    if actual == *expected {
        tracing::debug!(task = actual.task_name, "Safety guard passed");
        return Ok(());
    }

    let field = actual
        .first_mismatch(expected)
        .unwrap_or(GuardField::TaskName);
    tracing::error!(%field, "Safety guard rejected configuration");
    Err(NewsletterError::ConfigMismatch { field })
}
