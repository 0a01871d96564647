//! Configuration for the newsletter workflow.
//!
//! Every setting is read from the environment (after `.env` is loaded) and
//! can also be given as a long flag. A bare invocation needs no flags.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::Args;

use crate::error::{NewsletterError, Result};
use crate::state::DEFAULT_STATE_FILE;

/// Default task marker.
pub const DEFAULT_TASK_NAME: &str = "choi_threads_newsletter";

/// Default look-back window in hours.
pub const DEFAULT_HOURS_BACK: u32 = 24;

/// Default cap on entries per digest.
pub const DEFAULT_MAX_ITEMS: usize = 20;

/// Default timezone for the start-date gate and the subject timestamp.
pub const DEFAULT_LOCAL_TIMEZONE: &str = "Asia/Seoul";

/// Default Gemini model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-flash-latest";

/// Default digest title.
pub const DEFAULT_DIGEST_TITLE: &str = "Choi Threads";

/// Default language the summary is written in.
pub const DEFAULT_SUMMARY_LANGUAGE: &str = "Korean";

/// A credential that must never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The underlying value, for the request that needs it.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Google OAuth client credentials plus the long-lived refresh token.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: Secret,
    pub refresh_token: Secret,
}

/// Environment-backed command-line arguments.
#[derive(Args, Clone)]
pub struct ConfigArgs {
    /// Task marker checked by the safety guard
    #[arg(long, env = "TASK_NAME", default_value = DEFAULT_TASK_NAME)]
    pub task_name: String,

    /// RSS/Atom feed to digest
    #[arg(long, env = "RSS_URL")]
    pub rss_url: String,

    /// Digest recipient
    #[arg(long, env = "TO_EMAIL")]
    pub to_email: String,

    /// Sender address (the Gmail account that owns the token)
    #[arg(long, env = "FROM_EMAIL")]
    pub from_email: String,

    /// Google OAuth client ID
    #[arg(long, env = "GOOGLE_CLIENT_ID", hide_env_values = true)]
    pub google_client_id: String,

    /// Google OAuth client secret
    #[arg(long, env = "GOOGLE_CLIENT_SECRET", hide_env_values = true)]
    pub google_client_secret: String,

    /// Google OAuth refresh token with the gmail.send scope
    #[arg(long, env = "GOOGLE_REFRESH_TOKEN", hide_env_values = true)]
    pub google_refresh_token: String,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Preferred Gemini model (falls back to older flash models)
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    /// Look-back window in hours
    #[arg(long, env = "HOURS_BACK", default_value_t = DEFAULT_HOURS_BACK)]
    pub hours_back: u32,

    /// Max entries per digest
    #[arg(long, env = "MAX_ITEMS", default_value_t = DEFAULT_MAX_ITEMS)]
    pub max_items: usize,

    /// Dedup state file
    #[arg(long, env = "STATE_FILE", default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    /// Do not send before this local date (YYYY-MM-DD)
    #[arg(long, env = "START_DATE_LOCAL")]
    pub start_date_local: Option<String>,

    /// IANA timezone for the start date and the subject line
    #[arg(long, env = "LOCAL_TIMEZONE", default_value = DEFAULT_LOCAL_TIMEZONE)]
    pub local_timezone: String,

    /// Title used in the subject and heading
    #[arg(long, env = "DIGEST_TITLE", default_value = DEFAULT_DIGEST_TITLE)]
    pub digest_title: String,

    /// Language the summary is written in
    #[arg(long, env = "SUMMARY_LANGUAGE", default_value = DEFAULT_SUMMARY_LANGUAGE)]
    pub summary_language: String,
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct NewsletterConfig {
    pub task_name: String,
    pub feed_url: String,
    pub recipient_email: String,
    pub sender_email: String,
    pub hours_back: u32,
    pub max_items: usize,
    pub state_file: PathBuf,
    pub start_date_local: Option<NaiveDate>,
    pub local_timezone: Tz,
    pub digest_title: String,
    pub summary_language: String,
    pub credentials: OAuthCredentials,
    pub gemini_api_key: Secret,
    pub gemini_model: String,
}

impl TryFrom<ConfigArgs> for NewsletterConfig {
    type Error = NewsletterError;

    fn try_from(args: ConfigArgs) -> Result<Self> {
        if args.hours_back == 0 {
            return Err(NewsletterError::InvalidConfig(
                "HOURS_BACK must be at least 1".to_string(),
            ));
        }
        if args.max_items == 0 {
            return Err(NewsletterError::InvalidConfig(
                "MAX_ITEMS must be at least 1".to_string(),
            ));
        }

        let start_date_local = args
            .start_date_local
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_start_date)
            .transpose()?;

        let local_timezone: Tz = args.local_timezone.trim().parse().map_err(|e| {
            NewsletterError::InvalidConfig(format!(
                "LOCAL_TIMEZONE '{}' is not a known timezone: {e}",
                args.local_timezone
            ))
        })?;

        Ok(Self {
            task_name: args.task_name,
            feed_url: args.rss_url,
            recipient_email: args.to_email,
            sender_email: args.from_email,
            hours_back: args.hours_back,
            max_items: args.max_items,
            state_file: args.state_file,
            start_date_local,
            local_timezone,
            digest_title: args.digest_title,
            summary_language: args.summary_language,
            credentials: OAuthCredentials {
                client_id: args.google_client_id,
                client_secret: Secret::new(args.google_client_secret),
                refresh_token: Secret::new(args.google_refresh_token),
            },
            gemini_api_key: Secret::new(args.gemini_api_key),
            gemini_model: args.gemini_model,
        })
    }
}

fn parse_start_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        NewsletterError::InvalidConfig(format!(
            "START_DATE_LOCAL must be YYYY-MM-DD format (got '{raw}')"
        ))
    })
}

/// Configuration that passes the safety guard, for unit tests.
#[cfg(test)]
pub(crate) fn test_config() -> NewsletterConfig {
    use crate::guard::EXPECTED_TARGET;

    NewsletterConfig {
        task_name: EXPECTED_TARGET.task_name.to_string(),
        feed_url: EXPECTED_TARGET.feed_url.to_string(),
        recipient_email: EXPECTED_TARGET.recipient_email.to_string(),
        sender_email: "sender@gmail.com".to_string(),
        hours_back: DEFAULT_HOURS_BACK,
        max_items: DEFAULT_MAX_ITEMS,
        state_file: PathBuf::from(DEFAULT_STATE_FILE),
        start_date_local: None,
        local_timezone: chrono_tz::Asia::Seoul,
        digest_title: DEFAULT_DIGEST_TITLE.to_string(),
        summary_language: DEFAULT_SUMMARY_LANGUAGE.to_string(),
        credentials: OAuthCredentials {
            client_id: "client-id".to_string(),
            client_secret: Secret::new("client-secret"),
            refresh_token: Secret::new("refresh-token"),
        },
        gemini_api_key: Secret::new("gemini-key"),
        gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
    }
}
