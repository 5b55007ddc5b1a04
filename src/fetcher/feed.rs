//! Feed Model
//!
//! The subset of an RSS/Atom document the proxy renders, parsed with feed-rs.

use chrono::{DateTime, SecondsFormat, Utc};
use feed_rs::model::Text;
use feed_rs::parser::{self, ParseFeedError};

/// Channel-level data plus entries in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    pub description: String,
    pub updated: Option<DateTime<Utc>>,
    pub entries: Vec<FeedEntry>,
}

/// A single item of the feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: Option<String>,
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
}

impl Feed {
    /// Parses an RSS or Atom document.
    ///
    /// Dates that are missing or unparsable come back as `None`.
    pub fn parse(body: &[u8]) -> Result<Self, ParseFeedError> {
        let raw = parser::parse(body)?;

        let entries = raw
            .entries
            .into_iter()
            .map(|entry| FeedEntry {
                title: text_or_empty(entry.title),
                link: entry.links.into_iter().next().map(|link| link.href),
                summary: text_or_empty(entry.summary),
                published: entry.published.or(entry.updated),
            })
            .collect();

        Ok(Self {
            description: text_or_empty(raw.description),
            updated: raw.updated,
            entries,
        })
    }
}

fn text_or_empty(text: Option<Text>) -> String {
    text.map(|t| t.content.trim().to_string()).unwrap_or_default()
}

/// Formats a timestamp as ISO-8601 UTC (`2024-06-15T12:00:00Z`).
///
/// Falls back to the current time when the source had no usable date.
pub fn iso_timestamp(when: Option<DateTime<Utc>>) -> String {
    when.unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel>
    <title>Test Blog</title>
    <link>https://test.bearblog.dev</link>
    <description>A test blog for testing purposes.</description>
    <lastBuildDate>Sat, 15 Jun 2024 12:00:00 +0000</lastBuildDate>
    <item>
        <title>First Post</title>
        <link>https://test.bearblog.dev/first-post/</link>
        <description>Summary of the first post.</description>
        <pubDate>Sat, 15 Jun 2024 10:00:00 +0000</pubDate>
    </item>
    <item>
        <title>Second Post</title>
        <link>https://test.bearblog.dev/second-post/</link>
        <description>Summary of the second post.</description>
    </item>
</channel>
</rss>"#;

    #[test]
    fn test_parse_channel() {
        let feed = Feed::parse(RSS.as_bytes()).unwrap();

        assert_eq!(feed.description, "A test blog for testing purposes.");
        assert_eq!(
            feed.updated,
            Some(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_entries_in_order() {
        let feed = Feed::parse(RSS.as_bytes()).unwrap();

        assert_eq!(feed.entries.len(), 2);
        let first = &feed.entries[0];
        assert_eq!(first.title, "First Post");
        assert_eq!(first.link.as_deref(), Some("https://test.bearblog.dev/first-post/"));
        assert_eq!(first.summary, "Summary of the first post.");
        assert_eq!(
            first.published,
            Some(Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap())
        );
        assert_eq!(feed.entries[1].title, "Second Post");
        assert!(feed.entries[1].published.is_none());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(Feed::parse(b"this is not xml").is_err());
    }

    #[test]
    fn test_iso_timestamp() {
        let when = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(iso_timestamp(Some(when)), "2024-06-15T12:00:00Z");
    }

    #[test]
    fn test_iso_timestamp_falls_back_to_now() {
        let result = iso_timestamp(None);

        assert!(result.ends_with('Z'));
        assert!(result.starts_with(&Utc::now().year().to_string()));
    }
}
