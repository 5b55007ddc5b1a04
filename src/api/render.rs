//! Page rendering
//!
//! Gemtext layouts for the capsule pages and the Atom feed served at `/feed`.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::convert::extract_slug;
use crate::fetcher::{iso_timestamp, Feed};

/// Number of feed entries listed on the landing page
pub const INDEX_POST_LIMIT: usize = 10;

/// Description shown on the about page when the feed has none
pub const DEFAULT_DESCRIPTION: &str = "A personal blog.";

/// Landing page: description, static pages, recent posts.
pub fn index_page(blog_name: &str, pages: &BTreeMap<String, String>, feed: &Feed) -> String {
    let mut out = format!("# {}\n\n", blog_name);
    if !feed.description.is_empty() {
        let _ = writeln!(out, "{}\n", feed.description);
    }

    if !pages.is_empty() {
        out.push_str("## Pages\n\n");
        for (slug, title) in pages {
            let _ = writeln!(out, "=> /page/{} {}", slug, title);
        }
        out.push('\n');
    }

    out.push_str("## Recent posts\n\n");
    for entry in feed.entries.iter().take(INDEX_POST_LIMIT) {
        let slug = match entry.link.as_deref().map(extract_slug) {
            Some(slug) if !slug.is_empty() => slug,
            _ => continue,
        };
        let title = if entry.title.is_empty() { "Untitled" } else { entry.title.as_str() };
        match entry.published {
            Some(date) => {
                let _ = writeln!(out, "=> /post/{} {} - {}", slug, date.format("%a, %d %b %Y"), title);
            }
            None => {
                let _ = writeln!(out, "=> /post/{} {}", slug, title);
            }
        }
    }

    out.push_str("\n=> /about About\n=> /feed Atom feed\n");
    out
}

/// A single post or page.
///
/// `date` is shown as a "Published:" line only when present and non-empty.
pub fn content_page(title: &str, date: Option<&str>, content: &str, web_url: &str) -> String {
    let mut out = format!("# {}\n\n", title);
    if let Some(date) = date.filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "Published: {}\n", date);
    }
    if !content.is_empty() {
        let _ = writeln!(out, "{}\n", content);
    }
    let _ = writeln!(out, "=> {} View on the web", web_url);
    let _ = writeln!(out, "=> / Back to index");
    out
}

pub fn about_page(blog_name: &str, description: &str, web_url: &str) -> String {
    let description = if description.is_empty() { DEFAULT_DESCRIPTION } else { description };
    format!(
        "# About {}\n\n{}\n\n=> {} Visit on the web\n=> / Back to index\n",
        blog_name, description, web_url
    )
}

// == Atom Feed ==
/// Re-publishes the upstream feed as Atom with gemini:// links.
///
/// Entries without a usable slug are skipped.
pub fn atom_feed(blog_name: &str, base_url: &str, feed: &Feed) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n");
    let _ = writeln!(out, "  <title>{}</title>", xml_escape(blog_name));
    let _ = writeln!(out, "  <link href=\"{}/\"/>", xml_escape(base_url));
    let _ = writeln!(out, "  <id>{}/</id>", xml_escape(base_url));
    let _ = writeln!(out, "  <updated>{}</updated>", iso_timestamp(feed.updated));

    for entry in &feed.entries {
        let slug = match entry.link.as_deref().map(extract_slug) {
            Some(slug) if !slug.is_empty() => slug,
            _ => continue,
        };
        let url = xml_escape(&format!("{}/post/{}", base_url, slug));
        let title = if entry.title.is_empty() { "Untitled" } else { entry.title.as_str() };

        out.push_str("  <entry>\n");
        let _ = writeln!(out, "    <title>{}</title>", xml_escape(title));
        let _ = writeln!(out, "    <link href=\"{}\"/>", url);
        let _ = writeln!(out, "    <id>{}</id>", url);
        let _ = writeln!(out, "    <updated>{}</updated>", iso_timestamp(entry.published));
        let _ = writeln!(out, "    <summary>{}</summary>", xml_escape(&entry.summary));
        out.push_str("  </entry>\n");
    }

    out.push_str("</feed>\n");
    out
}

/// Escapes text for element content and double-quoted attributes.
pub fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
