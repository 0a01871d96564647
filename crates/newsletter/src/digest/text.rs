//! Text helpers shared by the prompt and the digest templates.

use scraper::Html;

use crate::feed::UNTITLED;

/// Default title width in the digest.
pub const COMPACT_TITLE_CHARS: usize = 72;

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip markup and decode entities, leaving collapsed plain text.
pub fn strip_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(text);
    let plain: Vec<&str> = fragment.root_element().text().collect();
    collapse_whitespace(&plain.join(" "))
}

/// Truncate to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

/// Single-line title suitable for a digest row.
pub fn compact_title(title: &str, max_chars: usize) -> String {
    let clean = strip_html(title);
    let clean = clean.trim_matches(|c: char| c == ' ' || c == '-' || c == '|');
    if clean.is_empty() {
        return UNTITLED.to_string();
    }
    truncate_chars(clean, max_chars)
}

/// Simple HTML escaping for user content.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
