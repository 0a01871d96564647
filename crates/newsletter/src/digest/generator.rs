//! Digest content generator.
//!
//! Builds email content from feed entries and the model summary.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::fmt::Write;

use super::text::{compact_title, html_escape, COMPACT_TITLE_CHARS};
use super::Digest;
use crate::feed::FeedEntry;

/// Per-run values that shape the digest.
#[derive(Debug, Clone)]
pub struct DigestContext {
    /// Title used in the subject and heading.
    pub title: String,
    /// Look-back window the digest covers.
    pub hours_back: u32,
    /// Timezone for the subject timestamp.
    pub timezone: Tz,
    /// When the digest was generated.
    pub generated_at: DateTime<Utc>,
}

/// Generates digest email content.
pub struct DigestGenerator;

impl DigestGenerator {
    /// Compose the full digest.
    #[must_use]
    pub fn compose(entries: &[FeedEntry], summary: &str, ctx: &DigestContext) -> Digest {
        Digest {
            subject: Self::subject(ctx),
            text_body: Self::generate_text(entries, summary, ctx),
            html_body: Self::generate_html(entries, summary, ctx),
            identifiers: entries.iter().map(|e| e.identifier().to_string()).collect(),
        }
    }

    /// Subject line, stamped in the configured local timezone.
    #[must_use]
    pub fn subject(ctx: &DigestContext) -> String {
        let local = ctx.generated_at.with_timezone(&ctx.timezone);
        format!(
            "[{title}] Last {hours}h Digest - {stamp}",
            title = ctx.title,
            hours = ctx.hours_back,
            stamp = local.format("%Y-%m-%d %H:%M"),
        )
    }

    /// Generate plain-text email content.
    #[must_use]
    pub fn generate_text(entries: &[FeedEntry], summary: &str, ctx: &DigestContext) -> String {
        let mut text = format!(
            "{title} Digest (last {hours}h)\n\n{count} new posts\n\n",
            title = ctx.title,
            hours = ctx.hours_back,
            count = entries.len(),
        );

        for (idx, entry) in entries.iter().enumerate() {
            let _ = write!(
                text,
                "[{n}] {title}\n- Link: {link}\n- Published (UTC): {published}\n\n",
                n = idx + 1,
                title = compact_title(&entry.title, COMPACT_TITLE_CHARS),
                link = entry.link,
                published = entry.published_at.to_rfc3339(),
            );
        }

        text.push_str("===== Summary and adaptation points =====\n");
        text.push_str(summary);
        text.push_str("\n\n");
        let _ = write!(
            text,
            "Generated at (UTC): {}",
            ctx.generated_at.to_rfc3339()
        );

        text
    }

    /// Generate HTML email content.
    #[must_use]
    pub fn generate_html(entries: &[FeedEntry], summary: &str, ctx: &DigestContext) -> String {
        let mut cards = String::new();
        for (idx, entry) in entries.iter().enumerate() {
            let link = html_escape(&entry.link);
            let _ = write!(
                cards,
                r#"
            <article class="card">
                <strong class="title">[{n}] {title}</strong>
                <div class="link"><a href="{link}">{link}</a></div>
                <div class="meta">Published (UTC): {published}</div>
            </article>"#,
                n = idx + 1,
                title = html_escape(&compact_title(&entry.title, COMPACT_TITLE_CHARS)),
                link = link,
                published = html_escape(&entry.published_at.to_rfc3339()),
            );
        }

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{
            margin: 0;
            background: #f6f7f9;
            color: #1f2937;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
        }}
        .wrap {{
            max-width: 760px;
            margin: 0 auto;
            padding: 24px 16px 40px;
        }}
        .hero {{
            background: #ffffff;
            border: 1px solid #e5e7eb;
            border-radius: 14px;
            padding: 18px 18px 14px;
        }}
        .headline {{
            margin: 0;
            font-size: 22px;
            line-height: 1.25;
            letter-spacing: -0.02em;
        }}
        .sub {{
            margin: 8px 0 0;
            color: #6b7280;
            font-size: 13px;
        }}
        .section {{
            margin-top: 16px;
        }}
        .card {{
            background: #ffffff;
            border: 1px solid #e5e7eb;
            border-radius: 12px;
            padding: 14px;
            margin: 10px 0;
        }}
        .title {{
            display: block;
            font-size: 16px;
            line-height: 1.45;
        }}
        .link {{
            margin-top: 8px;
            word-break: break-all;
        }}
        .link a {{
            color: #0f766e;
            font-size: 14px;
            font-weight: 700;
            text-decoration: none;
        }}
        .meta {{
            margin-top: 6px;
            font-size: 12px;
            color: #6b7280;
        }}
        .summary {{
            background: #ffffff;
            border: 1px solid #e5e7eb;
            border-radius: 12px;
            padding: 14px;
        }}
        .summary pre {{
            margin: 0;
            white-space: pre-wrap;
            word-break: break-word;
            font: 13px/1.6 ui-monospace, SFMono-Regular, Menlo, Consolas, monospace;
            color: #111827;
        }}
        .foot {{
            margin-top: 14px;
            color: #6b7280;
            font-size: 12px;
        }}
    </style>
</head>
<body>
    <div class="wrap">
        <header class="hero">
            <h1 class="headline">{title} Digest (last {hours}h)</h1>
            <p class="sub">{count} new posts</p>
        </header>
        <section class="section">{cards}
        </section>
        <section class="section summary">
            <strong>Summary and adaptation points</strong>
            <pre>{summary}</pre>
        </section>
        <div class="foot">Generated at (UTC): {generated}</div>
    </div>
</body>
</html>"#,
            title = html_escape(&ctx.title),
            hours = ctx.hours_back,
            count = entries.len(),
            cards = cards,
            summary = html_escape(summary),
            generated = html_escape(&ctx.generated_at.to_rfc3339()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ctx() -> DigestContext {
        DigestContext {
            title: "Choi Threads".to_string(),
            hours_back: 24,
            timezone: chrono_tz::Asia::Seoul,
            generated_at: Utc.with_ymd_and_hms(2026, 10, 17, 23, 5, 0).unwrap(),
        }
    }

    fn entries() -> Vec<FeedEntry> {
        let published = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        vec![
            FeedEntry::new("First <b>post</b>", "https://t.example/1", published),
            FeedEntry::new("Second & more", "https://t.example/2?a=1&b=2", published),
        ]
    }

    #[test]
    fn test_subject_uses_local_time() {
        // 23:05 UTC is 08:05 the next day in Seoul.
        assert_eq!(
            DigestGenerator::subject(&ctx()),
            "[Choi Threads] Last 24h Digest - 2026-10-18 08:05"
        );
    }

    #[test]
    fn test_text_body() {
        let text = DigestGenerator::generate_text(&entries(), "## Overall trend", &ctx());

        assert!(text.starts_with("Choi Threads Digest (last 24h)"));
        assert!(text.contains("2 new posts"));
        assert!(text.contains("[1] First post\n- Link: https://t.example/1"));
        assert!(text.contains("[2] Second & more"));
        assert!(text.contains("## Overall trend"));
        assert!(text.ends_with("Generated at (UTC): 2026-10-17T23:05:00+00:00"));
    }

    #[test]
    fn test_html_body_escapes_content() {
        let html = DigestGenerator::generate_html(&entries(), "<script>x</script>", &ctx());

        assert!(html.contains("[1] First post"));
        assert!(html.contains("Second &amp; more"));
        assert!(html.contains(r#"href="https://t.example/2?a=1&amp;b=2""#));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_compose_collects_identifiers() {
        let digest = DigestGenerator::compose(&entries(), "summary", &ctx());
        assert_eq!(
            digest.identifiers,
            vec!["https://t.example/1", "https://t.example/2?a=1&b=2"]
        );
    }
}
