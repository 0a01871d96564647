//! Feed data types.

use chrono::{DateTime, Utc};

/// A single feed item eligible for a digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Entry title as published (may contain markup).
    pub title: String,
    /// Canonical link. Doubles as the dedup identifier.
    pub link: String,
    /// Publish time, falling back to the last update time.
    pub published_at: DateTime<Utc>,
    /// Summary or content hint (may contain markup).
    pub summary: String,
    /// Engagement count when the feed exposes one.
    pub view_count: Option<u64>,
}

impl FeedEntry {
    /// Create an entry with no summary or view count.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published_at,
            summary: String::new(),
            view_count: None,
        }
    }

    /// Identifier used by the dedup set.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.link
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    #[must_use]
    pub fn with_view_count(mut self, views: u64) -> Self {
        self.view_count = Some(views);
        self
    }
}
