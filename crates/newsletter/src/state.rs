//! Persistent dedup state.
//!
//! Tracks the identifiers (entry URLs) that have already gone out in a digest
//! so the next run only mails what is new.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::Result;

/// Default location of the state document.
pub const DEFAULT_STATE_FILE: &str = ".newsletter_state.json";

/// An identifier that has already been delivered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentItem {
    identifier: String,
}

impl SentItem {
    /// Create a sent item from an identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    /// The raw identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl Borrow<str> for SentItem {
    fn borrow(&self) -> &str {
        &self.identifier
    }
}

/// The dedup set persisted between runs.
///
/// Serialized as `{"sent_links": [...]}` with identifiers in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentSet {
    #[serde(rename = "sent_links", default)]
    items: BTreeSet<SentItem>,
}

impl SentSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether an identifier has already been sent.
    pub fn contains(&self, identifier: &str) -> bool {
        self.items.contains(identifier)
    }

    /// Record an identifier. Returns `false` if it was already present.
    pub fn insert(&mut self, identifier: impl Into<String>) -> bool {
        self.items.insert(SentItem::new(identifier))
    }

    /// Number of identifiers recorded.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been sent yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate identifiers in sorted order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(SentItem::identifier)
    }
}

impl<S: Into<String>> FromIterator<S> for SentSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(SentItem::new).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for SentSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.items.extend(iter.into_iter().map(SentItem::new));
    }
}

/// Load/save access to the dedup set.
pub trait StateStore: Send + Sync {
    /// Load the sent set. Never fails: unreadable state is treated as empty.
    fn load(&self) -> SentSet;

    /// Persist the sent set, replacing what was stored before.
    fn save(&self, sent: &SentSet) -> Result<()>;
}

/// Stores the sent set as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    /// Create a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> SentSet {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No state file, starting empty");
            return SentSet::default();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read state file, starting empty");
                return SentSet::default();
            }
        };

        match serde_json::from_str::<SentSet>(&content) {
            Ok(sent) => {
                tracing::debug!(path = %self.path.display(), count = sent.len(), "Loaded state");
                sent
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Malformed state file, starting empty");
                SentSet::default()
            }
        }
    }

    fn save(&self, sent: &SentSet) -> Result<()> {
        let content = serde_json::to_string_pretty(sent)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        // Write next to the target and rename over it so a crash never leaves
        // a half-written document behind.
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::debug!(path = %self.path.display(), count = sent.len(), "Saved state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_insert_dedups() {
        let mut sent = SentSet::new();
        assert!(sent.insert("https://a.example/1"));
        assert!(sent.insert("https://b.example/2"));
        assert!(!sent.insert("https://a.example/1"));

        assert_eq!(sent.len(), 2);
        assert!(sent.contains("https://a.example/1"));
        assert!(!sent.contains("https://c.example/3"));
    }

    #[test]
    fn test_serializes_sorted_under_sent_links() {
        let sent: SentSet = ["b", "a", "c"].into_iter().collect();
        let json = serde_json::to_value(&sent).unwrap();
        assert_eq!(json, serde_json::json!({ "sent_links": ["a", "b", "c"] }));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_malformed_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        std::fs::write(&path, "{ not json").unwrap();
        assert!(JsonStateStore::new(&path).load().is_empty());

        std::fs::write(&path, r#"{"sent_links": "oops"}"#).unwrap();
        assert!(JsonStateStore::new(&path).load().is_empty());
    }

    #[test]
    fn test_load_ignores_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"sent_links": ["x"], "version": 2}"#).unwrap();

        let sent = JsonStateStore::new(&path).load();
        assert_eq!(sent.identifiers().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonStateStore::new(dir.path().join("nested").join("state.json"));

        let sent: SentSet = ["https://a.example/1", "https://b.example/2"]
            .into_iter()
            .collect();
        store.save(&sent).unwrap();

        assert_eq!(store.load(), sent);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));

        store.save(&["a", "b"].into_iter().collect()).unwrap();
        store.save(&["c"].into_iter().collect()).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.identifiers().collect::<Vec<_>>(), vec!["c"]);
    }
}
