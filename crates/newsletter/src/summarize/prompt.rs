//! Prompt construction for the digest summary.

use std::fmt::Write;

use crate::digest::text::{collapse_whitespace, strip_html, truncate_chars};
use crate::feed::FeedEntry;

/// Max characters of each entry's content passed to the model.
const CONTENT_HINT_CHARS: usize = 2000;

/// Build the summarization prompt for a batch of entries.
pub fn build_prompt(entries: &[FeedEntry], language: &str, hours_back: u32) -> String {
    let mut items = String::new();
    for (idx, e) in entries.iter().enumerate() {
        let views = e
            .view_count
            .map_or_else(|| "unknown".to_string(), |v| v.to_string());
        let _ = write!(
            items,
            "[{n}]\ntitle: {title}\npublished_utc: {published}\nview_count: {views}\nlink: {link}\ncontent_hint: {hint}\n\n",
            n = idx + 1,
            title = collapse_whitespace(&e.title),
            published = e.published_at.to_rfc3339(),
            link = e.link,
            hint = truncate_chars(&strip_html(&e.summary), CONTENT_HINT_CHARS),
        );
    }

    format!(
        r"The following are posts published in the last {hours_back} hours.
Write the output in {language}, using only the format below.
- For each post: 1) a one-line summary 2) two actionable adaptation points
- At the end: three lines on the overall trend

Format:
## [number] title
- Summary: ...
- Adaptation points:
  1) ...
  2) ...

## Overall trend
- ...
- ...
- ...

Input data:
{items}"
    )
}
