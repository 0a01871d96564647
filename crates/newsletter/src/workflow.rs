//! Workflow driver - runs one fetch, summarize, send and record cycle.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::NewsletterConfig;
use crate::digest::{DigestContext, DigestGenerator};
use crate::error::Result;
use crate::feed::{select_new_entries, FeedSource, HttpFeedSource, SelectionWindow};
use crate::guard;
use crate::mail::{GmailSender, MailSender};
use crate::schedule;
use crate::state::{JsonStateStore, StateStore};
use crate::summarize::{GeminiSummarizer, Summarizer};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The local start date has not been reached; nothing was fetched.
    NotStarted { start_date: NaiveDate },
    /// No entries qualified; nothing was sent.
    NothingNew,
    /// A digest went out.
    Sent { count: usize, recipient: String },
}

/// Newsletter workflow orchestrator.
pub struct Workflow {
    config: NewsletterConfig,
    feed: Arc<dyn FeedSource>,
    summarizer: Arc<dyn Summarizer>,
    mailer: Arc<dyn MailSender>,
    store: Arc<dyn StateStore>,
}

impl Workflow {
    /// Create a workflow from explicit collaborators.
    #[must_use]
    pub fn new(
        config: NewsletterConfig,
        feed: Arc<dyn FeedSource>,
        summarizer: Arc<dyn Summarizer>,
        mailer: Arc<dyn MailSender>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            config,
            feed,
            summarizer,
            mailer,
            store,
        }
    }

    /// Wire the HTTP feed, Gemini, Gmail and the JSON state file.
    pub fn from_config(config: NewsletterConfig) -> Result<Self> {
        let feed = HttpFeedSource::new(config.feed_url.clone())?;
        let summarizer = GeminiSummarizer::new(
            config.gemini_api_key.clone(),
            &config.gemini_model,
            config.summary_language.clone(),
            config.hours_back,
        )?;
        let mailer = GmailSender::new(
            config.credentials.clone(),
            config.sender_email.clone(),
            config.recipient_email.clone(),
        )?;
        let store = JsonStateStore::new(config.state_file.clone());

        Ok(Self::new(
            config,
            Arc::new(feed),
            Arc::new(summarizer),
            Arc::new(mailer),
            Arc::new(store),
        ))
    }

    /// Run one cycle at the current time.
    pub async fn run(&self) -> Result<RunOutcome> {
        self.run_at(Utc::now()).await
    }

    /// Run one cycle as if the current time were `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunOutcome> {
        let config = &self.config;

        if let Some(start_date) = config.start_date_local {
            if schedule::should_skip_before_start(Some(start_date), config.local_timezone, now) {
                tracing::info!(
                    %start_date,
                    today = %schedule::local_today(config.local_timezone, now),
                    timezone = %config.local_timezone,
                    "Before start date, skipping send"
                );
                return Ok(RunOutcome::NotStarted { start_date });
            }
        }

        tracing::info!(task = %config.task_name, "Starting newsletter run");

        let mut sent = self.store.load();
        tracing::debug!(sent = sent.len(), "Loaded state");

        let entries = self.feed.fetch().await?;
        let fetched = entries.len();

        let window = SelectionWindow {
            hours_back: config.hours_back,
            max_items: config.max_items,
        };
        let selected = select_new_entries(entries, &sent, now, &window);
        tracing::info!(
            fetched,
            selected = selected.len(),
            hours_back = config.hours_back,
            "Selected new entries"
        );

        if selected.is_empty() {
            tracing::info!("No new entries, skipping send");
            return Ok(RunOutcome::NothingNew);
        }

        let summary = self.summarizer.summarize(&selected).await?;

        let ctx = DigestContext {
            title: config.digest_title.clone(),
            hours_back: config.hours_back,
            timezone: config.local_timezone,
            generated_at: now,
        };
        let digest = DigestGenerator::compose(&selected, &summary, &ctx);

        guard::check(config)?;
        self.mailer.send(&digest).await?;

        sent.extend(digest.identifiers.iter().cloned());
        self.store.save(&sent)?;
        tracing::debug!(sent = sent.len(), "Saved state");

        Ok(RunOutcome::Sent {
            count: digest.identifiers.len(),
            recipient: config.recipient_email.clone(),
        })
    }
}
