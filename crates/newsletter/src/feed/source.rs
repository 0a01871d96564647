//! Feed fetching over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use feed_rs::model::Entry;

use super::types::FeedEntry;
use super::views::scan_view_counts;
use crate::error::{NewsletterError, Result};

/// Request timeout for the feed download.
const FEED_TIMEOUT: Duration = Duration::from_secs(30);

/// Title used when an entry has none.
pub const UNTITLED: &str = "(untitled)";

/// Source of feed entries for one run.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch every entry currently in the feed.
    async fn fetch(&self) -> Result<Vec<FeedEntry>>;
}

/// Fetches and parses an RSS/Atom feed from a URL.
pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFeedSource {
    /// Create a source for the given feed URL.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FEED_TIMEOUT)
            .user_agent(concat!("newsletter/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<Vec<FeedEntry>> {
        let url = self.url.trim();
        tracing::info!(url, "Fetching feed");

        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| NewsletterError::Feed(e.to_string()))?;
        let body = response.bytes().await?;
        tracing::debug!(len = body.len(), "Got feed body");

        parse_feed(&body)
    }
}

/// Parse an RSS or Atom document into feed entries.
///
/// Entries without a usable timestamp are dropped; they can never fall
/// inside the selection window.
pub fn parse_feed(body: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(body).map_err(|e| NewsletterError::Feed(e.to_string()))?;
    let total = feed.entries.len();

    let mut scanned = scan_view_counts(body);
    if scanned.len() != total {
        tracing::debug!(
            total,
            scanned = scanned.len(),
            "Entry count mismatch, ignoring scanned view counts"
        );
        scanned = vec![None; total];
    }

    let entries: Vec<FeedEntry> = feed
        .entries
        .into_iter()
        .zip(scanned)
        .filter_map(|(entry, views)| convert_entry(entry, views))
        .collect();

    if entries.len() < total {
        tracing::debug!(
            total,
            kept = entries.len(),
            "Dropped feed entries without a timestamp"
        );
    }
    Ok(entries)
}

fn convert_entry(entry: Entry, scanned_views: Option<u64>) -> Option<FeedEntry> {
    let published_at = entry.published.or(entry.updated)?;

    let link = entry
        .links
        .first()
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
        .or_else(|| entry.id.starts_with("http").then(|| entry.id.trim().to_string()))
        .unwrap_or_default();

    let title = entry
        .title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let summary = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default()
        .trim()
        .to_string();

    let view_count = entry
        .media
        .iter()
        .find_map(|m| m.community.as_ref().and_then(|c| c.stats_views))
        .or(scanned_views);

    Some(FeedEntry {
        title,
        link,
        published_at,
        summary,
        view_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Threads</title>
    <link>https://threads.example</link>
    <description>posts</description>
    <item>
      <title>New model released</title>
      <link>https://threads.example/p/1</link>
      <description>&lt;p&gt;Release notes&lt;/p&gt;</description>
      <pubDate>Mon, 12 Oct 2026 09:30:00 GMT</pubDate>
      <media:community>
        <media:statistics views="1520" />
      </media:community>
    </item>
    <item>
      <title>No date here</title>
      <link>https://threads.example/p/2</link>
    </item>
    <item>
      <link>https://threads.example/p/3</link>
      <pubDate>Mon, 12 Oct 2026 10:00:00 +0900</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss() {
        let entries = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.title, "New model released");
        assert_eq!(first.link, "https://threads.example/p/1");
        assert_eq!(
            first.published_at,
            Utc.with_ymd_and_hms(2026, 10, 12, 9, 30, 0).unwrap()
        );
        assert!(first.summary.contains("Release notes"));
        assert_eq!(first.view_count, Some(1520));

        let untitled = &entries[1];
        assert_eq!(untitled.title, UNTITLED);
        assert_eq!(untitled.view_count, None);
        assert_eq!(
            untitled.published_at,
            Utc.with_ymd_and_hms(2026, 10, 12, 1, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_atom_uses_updated() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example</title>
  <id>urn:example</id>
  <updated>2026-10-12T08:00:00Z</updated>
  <entry>
    <title>Atom post</title>
    <id>urn:example:1</id>
    <link href="https://atom.example/1"/>
    <updated>2026-10-12T08:00:00Z</updated>
    <summary>Short</summary>
  </entry>
</feed>"#;
        let entries = parse_feed(atom.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://atom.example/1");
        assert_eq!(entries[0].summary, "Short");
    }

    #[test]
    fn test_parse_garbage_fails() {
        let err = parse_feed(b"definitely not xml").unwrap_err();
        assert!(matches!(err, NewsletterError::Feed(_)));
    }
}
