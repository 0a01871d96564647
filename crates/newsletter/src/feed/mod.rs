//! Feed polling module.
//!
//! Fetches the RSS/Atom document and selects the entries that belong in
//! this run's digest.

mod select;
mod source;
mod types;
mod views;

pub use select::{select_new_entries, SelectionWindow};
pub use source::{parse_feed, FeedSource, HttpFeedSource, UNTITLED};
pub use types::FeedEntry;
