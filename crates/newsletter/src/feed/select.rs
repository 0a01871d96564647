//! Entry selection: time window, dedup, ranking and the per-run cap.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use super::types::FeedEntry;
use crate::state::SentSet;

/// Which entries qualify for a digest.
#[derive(Debug, Clone, Copy)]
pub struct SelectionWindow {
    /// Look-back period ending at the run time.
    pub hours_back: u32,
    /// Max entries to include.
    pub max_items: usize,
}

impl SelectionWindow {
    /// Earliest publish time that still qualifies.
    ///
    /// Saturates at the earliest representable time for very large windows.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        Duration::try_hours(i64::from(self.hours_back))
            .and_then(|back| now.checked_sub_signed(back))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Select the entries to mail in this run.
///
/// Keeps entries published inside `[now - hours_back, now]` that have a link
/// and are not in `sent`. Duplicate links collapse to the first occurrence.
/// Entries with a view count rank first (most viewed first), then newest
/// first; at most `max_items` are returned.
pub fn select_new_entries(
    entries: Vec<FeedEntry>,
    sent: &SentSet,
    now: DateTime<Utc>,
    window: &SelectionWindow,
) -> Vec<FeedEntry> {
    let cutoff = window.cutoff(now);
    let mut seen = HashSet::new();

    let mut selected: Vec<FeedEntry> = entries
        .into_iter()
        .filter(|e| e.published_at >= cutoff && e.published_at <= now)
        .filter(|e| !e.link.is_empty())
        .filter(|e| !sent.contains(e.identifier()))
        .filter(|e| seen.insert(e.link.clone()))
        .collect();

    selected.sort_by(|a, b| {
        a.view_count
            .is_none()
            .cmp(&b.view_count.is_none())
            .then_with(|| b.view_count.cmp(&a.view_count))
            .then_with(|| b.published_at.cmp(&a.published_at))
    });

    if selected.len() > window.max_items {
        tracing::info!(
            available = selected.len(),
            max_items = window.max_items,
            "Capping digest size; remaining entries stay eligible"
        );
        selected.truncate(window.max_items);
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap()
    }

    fn entry(link: &str, hours_ago: i64) -> FeedEntry {
        FeedEntry::new(format!("post {link}"), link, now() - Duration::hours(hours_ago))
    }

    const WINDOW: SelectionWindow = SelectionWindow {
        hours_back: 24,
        max_items: 20,
    };

    fn links(entries: &[FeedEntry]) -> BTreeSet<&str> {
        entries.iter().map(|e| e.link.as_str()).collect()
    }

    #[test]
    fn test_send_set_is_incoming_minus_sent() {
        let sent: SentSet = ["a", "b"].into_iter().collect();
        let incoming = vec![entry("a", 1), entry("c", 2)];

        let selected = select_new_entries(incoming, &sent, now(), &WINDOW);
        assert_eq!(links(&selected), BTreeSet::from(["c"]));
    }

    #[test]
    fn test_difference_for_several_sets() {
        let cases: &[(&[&str], &[&str], &[&str])] = &[
            (&[], &["x", "y"], &["x", "y"]),
            (&["x", "y"], &["x", "y"], &[]),
            (&["x"], &[], &[]),
            (&["p", "q"], &["q", "r", "s"], &["r", "s"]),
        ];

        for (sent, incoming, expected) in cases {
            let sent: SentSet = sent.iter().copied().collect();
            let incoming: Vec<FeedEntry> = incoming.iter().map(|l| entry(l, 3)).collect();
            let selected = select_new_entries(incoming, &sent, now(), &WINDOW);
            assert_eq!(
                links(&selected),
                expected.iter().copied().collect::<BTreeSet<_>>(),
                "sent={sent:?}"
            );
        }
    }

    #[test]
    fn test_window_bounds() {
        let incoming = vec![
            entry("fresh", 0),
            entry("edge", 24),
            entry("stale", 25),
            entry("future", -1),
        ];
        let selected = select_new_entries(incoming, &SentSet::new(), now(), &WINDOW);
        assert_eq!(links(&selected), BTreeSet::from(["fresh", "edge"]));
    }

    #[test]
    fn test_skips_empty_links_and_duplicates() {
        let incoming = vec![entry("", 1), entry("dup", 2), entry("dup", 3)];
        let selected = select_new_entries(incoming, &SentSet::new(), now(), &WINDOW);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].published_at, now() - Duration::hours(2));
    }

    #[test]
    fn test_ranking_views_then_recency() {
        let incoming = vec![
            entry("old-no-views", 10),
            entry("new-no-views", 1),
            entry("few-views", 5).with_view_count(10),
            entry("many-views", 8).with_view_count(500),
        ];
        let selected = select_new_entries(incoming, &SentSet::new(), now(), &WINDOW);
        let order: Vec<&str> = selected.iter().map(|e| e.link.as_str()).collect();
        assert_eq!(
            order,
            vec!["many-views", "few-views", "new-no-views", "old-no-views"]
        );
    }

    #[test]
    fn test_huge_window_saturates() {
        let window = SelectionWindow {
            hours_back: u32::MAX,
            max_items: 20,
        };
        assert_eq!(window.cutoff(now()), DateTime::<Utc>::MIN_UTC);

        let incoming = vec![entry("recent", 1), entry("ancient", 24 * 365 * 50)];
        let selected = select_new_entries(incoming, &SentSet::new(), now(), &window);
        assert_eq!(links(&selected), BTreeSet::from(["recent", "ancient"]));
    }

    #[test]
    fn test_cap() {
        let incoming: Vec<FeedEntry> = (0..5).map(|i| entry(&format!("e{i}"), i)).collect();
        let window = SelectionWindow {
            hours_back: 24,
            max_items: 2,
        };
        let selected = select_new_entries(incoming, &SentSet::new(), now(), &window);
        assert_eq!(links(&selected), BTreeSet::from(["e0", "e1"]));
    }
}
