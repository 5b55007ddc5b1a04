//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::time::Duration;

use gemproxy::gemini::{handle_connection, Request};
use gemproxy::{AppState, Config};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use wiremock::MockServer;

pub const SAMPLE_POST_HTML: &str = r#"
<!DOCTYPE html>
<html>
<head><title>Test Post</title></head>
<body>
<main>
    <h1>My Test Post</h1>
    <time datetime="2024-06-15">June 15, 2024</time>
    <p>This is the first paragraph of the post.</p>
    <p>This is another paragraph with a <a href="https://example.com">link</a>.</p>
    <h2>A Subheading</h2>
    <p>More content under the subheading.</p>
    <nav><a href="/">Home</a></nav>
    <footer>Footer content</footer>
</main>
<script>console.log('should be removed');</script>
</body>
</html>
"#;

pub const SAMPLE_PAGE_HTML: &str = r#"
<!DOCTYPE html>
<html>
<head><title>About Page</title></head>
<body>
<main>
    <h1>About Me</h1>
    <p>I am a developer who loves building things.</p>
    <p>Check out my <a href="/projects">projects</a>.</p>
</main>
</body>
</html>
"#;

pub const SAMPLE_RSS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
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
        <pubDate>Fri, 14 Jun 2024 09:00:00 +0000</pubDate>
    </item>
    <item>
        <title>Third Post</title>
        <link>https://test.bearblog.dev/third-post/</link>
        <description>Summary of the third post.</description>
        <pubDate>Thu, 13 Jun 2024 08:00:00 +0000</pubDate>
    </item>
</channel>
</rss>
"#;

/// Config pointed at the mock upstream.
pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::new(&server.uri(), "Test Blog").unwrap();
    config.fetch_timeout = Duration::from_secs(5);
    config.pages.insert("about".to_string(), "About".to_string());
    config
}

pub fn test_state(server: &MockServer) -> AppState {
    AppState::from_config(test_config(server)).unwrap()
}

pub fn request(path: &str) -> Request {
    Request::parse(&format!("gemini://capsule.test{}\r\n", path)).unwrap()
}

/// Number of upstream requests received for `path`.
pub async fn upstream_hits(server: &MockServer, path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == path)
        .count()
}

/// Sends raw bytes over an in-memory connection and returns everything written back.
pub async fn roundtrip(state: AppState, raw_request: &[u8]) -> String {
    let (mut client, server_side) = tokio::io::duplex(64 * 1024);
    let task = tokio::spawn(async move { handle_connection(server_side, &state).await });

    client.write_all(raw_request).await.unwrap();
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    task.await.unwrap().unwrap();

    String::from_utf8(out).unwrap()
}
