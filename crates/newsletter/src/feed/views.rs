//! View counts read straight from the feed document.
//!
//! feed-rs keeps an item's ungrouped Media RSS elements only when the item
//! also carries media content, so a bare `<media:community>` block is lost.
//! This pass walks the XML once and pulls a count out of each item.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// View count for every `<item>`/`<entry>`, in document order.
///
/// A count comes from the first attribute whose name contains "view"
/// (`<media:statistics views="1520"/>`), or from the text of an element whose
/// name contains "view" (`<viewCount>1,520</viewCount>`).
pub fn scan_view_counts(body: &[u8]) -> Vec<Option<u64>> {
    let mut reader = Reader::from_reader(body);
    let mut buf = Vec::new();
    let mut counts = Vec::new();

    // Some while inside an entry; depth counts open elements below it.
    let mut current: Option<Option<u64>> = None;
    let mut depth = 0usize;
    let mut in_view_element = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if let Some(views) = current.as_mut() {
                    depth += 1;
                    if views.is_none() {
                        *views = views_from_attributes(&e);
                    }
                    in_view_element = mentions_view(e.local_name().as_ref());
                } else if is_entry(&e) {
                    current = Some(None);
                    depth = 0;
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some(views) = current.as_mut() {
                    if views.is_none() {
                        *views = views_from_attributes(&e);
                    }
                } else if is_entry(&e) {
                    counts.push(None);
                }
            }
            Ok(Event::Text(text)) => {
                if let Some(views) = current.as_mut() {
                    if in_view_element && views.is_none() {
                        *views = parse_digits(&text);
                    }
                }
            }
            Ok(Event::End(_)) => {
                in_view_element = false;
                if current.is_some() {
                    if depth == 0 {
                        counts.push(current.take().flatten());
                    } else {
                        depth -= 1;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "Stopped scanning feed for view counts");
                break;
            }
        }
        buf.clear();
    }

    counts
}

fn is_entry(e: &BytesStart<'_>) -> bool {
    matches!(e.local_name().as_ref(), b"item" | b"entry")
}

fn mentions_view(name: &[u8]) -> bool {
    name.windows(4).any(|w| w.eq_ignore_ascii_case(b"view"))
}

fn views_from_attributes(e: &BytesStart<'_>) -> Option<u64> {
    e.attributes()
        .flatten()
        .filter(|attr| mentions_view(attr.key.local_name().as_ref()))
        .find_map(|attr| parse_digits(&attr.value))
}

/// Digits of a loosely formatted count such as `1,520`.
fn parse_digits(raw: &[u8]) -> Option<u64> {
    let digits: String = raw
        .iter()
        .filter(|b| b.is_ascii_digit())
        .map(|&b| char::from(b))
        .collect();
    digits.parse().ok()
}
