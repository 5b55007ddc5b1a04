//! Configuration Module
//!
//! Handles loading and validating proxy configuration from an optional
//! `gemproxy.toml` file and environment variables. Environment variables take
//! priority over the file.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "gemproxy.toml";

/// Proxy configuration parameters.
///
/// `upstream_url` and `blog_name` are required; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base address of the Bearblog site, without a trailing slash
    pub upstream_url: String,
    /// Display name of the capsule
    pub blog_name: String,
    /// Freshness window for the feed
    pub feed_ttl: Duration,
    /// Freshness window for rendered posts and pages
    pub document_ttl: Duration,
    /// Maximum number of cache entries
    pub cache_max_size: usize,
    /// Ceiling applied to every outbound request
    pub fetch_timeout: Duration,
    /// Static pages not present in the feed (slug -> title)
    pub pages: BTreeMap<String, String>,
    /// Host used when building gemini:// URLs in the Atom feed
    pub gemini_host: Option<String>,
    /// Gemini listener address
    pub host: String,
    /// Gemini listener port
    pub port: u16,
    /// Port for the admin HTTP endpoint, disabled when unset
    pub admin_port: Option<u16>,
}

impl Config {
    /// Creates a Config with defaults for everything but the two required values.
    pub fn new(upstream_url: &str, blog_name: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            upstream_url: normalize_upstream_url(upstream_url)?,
            blog_name: blog_name.into(),
            feed_ttl: Duration::from_secs(300),
            document_ttl: Duration::from_secs(1800),
            cache_max_size: 1000,
            fetch_timeout: Duration::from_secs(30),
            pages: BTreeMap::new(),
            gemini_host: None,
            host: "localhost".to_string(),
            port: 1965,
            admin_port: None,
        })
    }

    /// Loads configuration from `gemproxy.toml` and environment variables.
    ///
    /// A missing file is not an error. Each variable below overrides the file
    /// key of the same name in lower case.
    ///
    /// # Environment Variables
    /// - `BEARBLOG_URL` - Upstream site (required, http:// or https://)
    /// - `BLOG_NAME` - Capsule name (required)
    /// - `CACHE_TTL_FEED` - Feed TTL in seconds (default: 300)
    /// - `CACHE_TTL_POST` - Post/page TTL in seconds (default: 1800)
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `FETCH_TIMEOUT` - Upstream timeout in seconds (default: 30)
    /// - `PAGES` - JSON object of slug to title (default: `{}`)
    /// - `GEMINI_HOST` - Host for feed URLs (default: request host)
    /// - `HOST` - Listen address (default: localhost)
    /// - `PORT` - Listen port (default: 1965)
    /// - `ADMIN_PORT` - Admin HTTP port (default: disabled)
    pub fn from_env() -> Result<Self, ConfigError> {
        let file = FileConfig::load(Path::new(CONFIG_FILE))?;
        Self::from_sources(file, |name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup, without a file.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_sources(FileConfig::default(), lookup)
    }

    /// Merges file settings with a variable lookup; the lookup wins.
    pub fn from_sources<F>(file: FileConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let upstream_url = lookup("BEARBLOG_URL")
            .or(file.bearblog_url)
            .ok_or(ConfigError::Missing("BEARBLOG_URL"))?;
        let blog_name = lookup("BLOG_NAME")
            .or(file.blog_name)
            .ok_or(ConfigError::Missing("BLOG_NAME"))?;
        let mut config = Self::new(&upstream_url, blog_name)?;

        if let Some(secs) = parse_var::<u64>(&lookup, "CACHE_TTL_FEED")?.or(file.cache_ttl_feed) {
            config.feed_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "CACHE_TTL_POST")?.or(file.cache_ttl_post) {
            config.document_ttl = Duration::from_secs(secs);
        }
        if let Some(size) = parse_var::<usize>(&lookup, "CACHE_MAX_SIZE")?.or(file.cache_max_size) {
            if size == 0 {
                return Err(ConfigError::Invalid {
                    name: "CACHE_MAX_SIZE",
                    reason: "must be at least 1".to_string(),
                });
            }
            config.cache_max_size = size;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "FETCH_TIMEOUT")?.or(file.fetch_timeout) {
            config.fetch_timeout = Duration::from_secs(secs);
        }
        match lookup("PAGES") {
            Some(raw) => {
                config.pages = serde_json::from_str(&raw).map_err(|e| ConfigError::Invalid {
                    name: "PAGES",
                    reason: e.to_string(),
                })?;
            }
            None => {
                if let Some(pages) = file.pages {
                    config.pages = pages;
                }
            }
        }
        config.gemini_host = lookup("GEMINI_HOST")
            .or(file.gemini_host)
            .filter(|h| !h.is_empty());
        if let Some(host) = lookup("HOST").or(file.host) {
            config.host = host;
        }
        if let Some(port) = parse_var::<u16>(&lookup, "PORT")?.or(file.port) {
            config.port = port;
        }
        config.admin_port = parse_var::<u16>(&lookup, "ADMIN_PORT")?.or(file.admin_port);

        Ok(config)
    }
}

/// Settings read from `gemproxy.toml`. Every key is optional.
///
/// ```toml
/// bearblog_url = "https://example.bearblog.dev"
/// blog_name = "My Blog"
/// pages = { about = "About Me", now = "Now" }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub bearblog_url: Option<String>,
    pub blog_name: Option<String>,
    pub cache_ttl_feed: Option<u64>,
    pub cache_ttl_post: Option<u64>,
    pub cache_max_size: Option<usize>,
    pub fetch_timeout: Option<u64>,
    pub pages: Option<BTreeMap<String, String>>,
    pub gemini_host: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub admin_port: Option<u16>,
}

impl FileConfig {
    /// Reads `path`, falling back to an empty config when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("Config file {} not found, using environment only", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        parse_toml(&contents, &path.display().to_string())
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        parse_toml(contents, CONFIG_FILE)
    }
}

fn parse_toml(contents: &str, path: &str) -> Result<FileConfig, ConfigError> {
    toml::from_str(contents).map_err(|e| ConfigError::File {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

/// Strips trailing slashes and requires an explicit http(s) scheme.
pub fn normalize_upstream_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            name: "BEARBLOG_URL",
            reason: "must start with http:// or https://".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            }),
    }
}
