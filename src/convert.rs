//! HTML to gemtext conversion
//!
//! Bearblog pages keep the article in `<main>`, the title in the first `<h1>`
//! and the publication date in a `<time>` element. The body is rendered with
//! html2text after the page chrome has been stripped.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::warn;

/// Wide enough that html2text never hard-wraps; Gemini clients wrap themselves.
const RENDER_WIDTH: usize = 10_000;

/// Elements dropped from the content before rendering.
const STRIPPED_TAGS: [&str; 5] = ["script", "style", "nav", "footer", "form"];

fn main_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<main\b[^>]*>(.*)</main\s*>").expect("valid regex"))
}

fn body_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<body\b[^>]*>(.*?)(?:</body\s*>|$)").expect("valid regex"))
}

fn h1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h1\b[^>]*>(.*?)</h1\s*>").expect("valid regex"))
}

fn time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<time\b([^>]*)>(.*?)</time\s*>").expect("valid regex"))
}

fn datetime_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\bdatetime\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
    })
}

fn stripped_re() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        STRIPPED_TAGS
            .iter()
            .map(|tag| {
                Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>|<{tag}\b[^>]*/>"))
                    .expect("valid regex")
            })
            .collect()
    })
}

fn footnote_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[(\d+)\]: (\S+)$").expect("valid regex"))
}

fn link_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\[\]]*)\]\[(\d+)\]").expect("valid regex"))
}

fn pre_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<pre\b[^>]*>(.*?)</pre\s*>").expect("valid regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"))
}

// == Html To Gemtext ==
/// Converts a Bearblog page to gemtext.
///
/// Returns an empty string when the page has neither `<main>` nor `<body>`.
/// Preformatted blocks are fenced with triple backticks and every link
/// becomes a `=> url label` line after the paragraph it appeared in.
pub fn html_to_gemtext(html: &str) -> String {
    let content = match main_re()
        .captures(html)
        .or_else(|| body_re().captures(html))
        .and_then(|caps| caps.get(1))
    {
        Some(m) => m.as_str(),
        None => return String::new(),
    };

    let mut content = content.to_string();
    for re in stripped_re() {
        content = re.replace_all(&content, "").into_owned();
    }
    let content = h1_re().replacen(&content, 1, "");

    let mut blocks = Vec::new();
    let mut rest = 0;
    for caps in pre_re().captures_iter(&content) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        blocks.push(prose_to_gemtext(&content[rest..whole.start()]));
        blocks.push(preformatted(inner.as_str()));
        rest = whole.end();
    }
    blocks.push(prose_to_gemtext(&content[rest..]));

    blocks.retain(|block| !block.is_empty());
    blocks.join("\n\n")
}

/// Renders flowing HTML, moving html2text link footnotes (`[label][n]` plus a
/// trailing `[n]: url`) onto link lines below each paragraph.
fn prose_to_gemtext(html: &str) -> String {
    let rendered = render_text(html);

    let mut targets = HashMap::new();
    let mut lines = Vec::new();
    for line in rendered.lines() {
        match footnote_re().captures(line) {
            Some(caps) => {
                targets.insert(caps[1].to_string(), caps[2].to_string());
            }
            None => lines.push(line.trim_end()),
        }
    }

    let mut out: Vec<String> = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    for line in lines {
        if line.is_empty() {
            out.append(&mut pending);
            out.push(String::new());
            continue;
        }
        let text = link_ref_re().replace_all(line, |caps: &Captures| {
            let label = &caps[1];
            match targets.get(&caps[2]) {
                Some(url) => {
                    pending.push(link_line(url, label));
                    label.to_string()
                }
                None => caps[0].to_string(),
            }
        });
        out.push(text.into_owned());
    }
    out.append(&mut pending);

    out.join("\n").trim().to_string()
}

fn link_line(url: &str, label: &str) -> String {
    let label = label.trim();
    if label.is_empty() || label == url {
        format!("=> {}", url)
    } else {
        format!("=> {} {}", url, label)
    }
}

/// Fences the text of a `<pre>` block so clients render it verbatim.
fn preformatted(inner: &str) -> String {
    let text = tag_re().replace_all(inner, "");
    let rendered = render_text(&format!("<pre>{}</pre>", text));
    let body = rendered
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    let body = body.trim_matches('\n');
    if body.trim().is_empty() {
        return String::new();
    }
    format!("```\n{}\n```", body)
}

fn render_text(html: &str) -> String {
    let rendered = html2text::config::plain()
        .link_footnotes(true)
        .string_from_read(html.as_bytes(), RENDER_WIDTH);
    match rendered {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "failed to render HTML fragment");
            String::new()
        }
    }
}

// == Extract Metadata ==
/// Extracts `(title, date)` from a Bearblog page.
///
/// The title falls back to `"Untitled"`. The date prefers the `datetime`
/// attribute of the first `<time>`, then its text, then the empty string.
pub fn extract_metadata(html: &str) -> (String, String) {
    let title = h1_re()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| inline_text(m.as_str()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled".to_string());

    let date = match time_re().captures(html) {
        Some(caps) => {
            let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            match datetime_attr_re().captures(attrs) {
                Some(attr) => attr
                    .get(1)
                    .or_else(|| attr.get(2))
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default(),
                None => caps
                    .get(2)
                    .map(|m| inline_text(m.as_str()))
                    .unwrap_or_default(),
            }
        }
        None => String::new(),
    };

    (title, date)
}

/// Plain text of an inline fragment, whitespace collapsed.
fn inline_text(fragment: &str) -> String {
    render_text(fragment)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// == Extract Slug ==
/// Returns the last path segment of a post URL.
///
/// `https://blog.dev/el-internetsito/` -> `el-internetsito`. A URL with no
/// path (the last segment contains a dot, so it is the host) yields `""`.
pub fn extract_slug(url: &str) -> String {
    let segment = url.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    if segment.contains('.') {
        return String::new();
    }
    segment.to_string()
}
