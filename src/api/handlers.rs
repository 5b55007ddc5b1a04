//! Gemini Handlers
//!
//! One handler per capsule route. Each one reads through the shared cache and
//! falls back to the fetch gateway on a miss.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::render;
use crate::cache::CacheStore;
use crate::config::Config;
use crate::convert::{extract_metadata, html_to_gemtext};
use crate::error::{FetchError, Result};
use crate::fetcher::{Feed, FetchGateway};
use crate::gemini::Response;

/// MIME type of the re-published feed
pub const ATOM_MIME: &str = "application/atom+xml";

/// Cache key of the upstream feed
pub const FEED_KEY: &str = "feed";

/// Values held in the shared cache.
///
/// Both payload kinds share one store and one capacity budget.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Feed(Arc<Feed>),
    Gemtext(String),
}

/// Class of a slug-addressed document. Each class has its own key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Post,
    Page,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Page => "page",
        }
    }

    /// `post:my-post`, `page:my-post`
    pub fn cache_key(self, slug: &str) -> String {
        format!("{}:{}", self.as_str(), slug)
    }

    /// Pages are undated; posts show their publication date.
    pub fn shows_date(self) -> bool {
        self == ContentKind::Post
    }
}

/// Application state shared across all connections.
///
/// The cache sits behind a single async mutex. Handlers hold it only for the
/// in-memory get or set, never across an upstream request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<Mutex<CacheStore<CachedValue>>>,
    pub gateway: FetchGateway,
}

impl AppState {
    /// Creates a new AppState with an empty cache sized from `config`.
    pub fn new(config: Config, gateway: FetchGateway) -> Self {
        let cache = CacheStore::new(config.cache_max_size);
        Self {
            config: Arc::new(config),
            cache: Arc::new(Mutex::new(cache)),
            gateway,
        }
    }

    /// Creates a new AppState and its HTTP client from configuration.
    pub fn from_config(config: Config) -> reqwest::Result<Self> {
        let gateway = FetchGateway::new(config.upstream_url.clone(), config.fetch_timeout)?;
        Ok(Self::new(config, gateway))
    }
}

// == Feed Loading ==
/// Returns the feed, from cache when fresh.
///
/// Concurrent misses are not coalesced: each one fetches upstream and the
/// last write wins.
pub async fn load_feed(state: &AppState) -> Result<Arc<Feed>> {
    let cached = {
        let mut cache = state.cache.lock().await;
        cache.get(FEED_KEY, state.config.feed_ttl)
    };
    if let Some(CachedValue::Feed(feed)) = cached {
        debug!("feed served from cache");
        return Ok(feed);
    }

    info!("feed cache miss, fetching upstream");
    let feed = Arc::new(state.gateway.fetch_feed().await.map_err(|e| {
        warn!(error = %e, "feed fetch failed");
        e
    })?);

    state
        .cache
        .lock()
        .await
        .set(FEED_KEY, CachedValue::Feed(Arc::clone(&feed)));
    Ok(feed)
}

// == Content Rendering ==
/// Returns the rendered gemtext of a post or page, from cache when fresh.
///
/// Failures are never cached, so the next request retries upstream.
pub async fn load_content(state: &AppState, slug: &str, kind: ContentKind) -> Result<String> {
    let key = kind.cache_key(slug);
    let cached = {
        let mut cache = state.cache.lock().await;
        cache.get(&key, state.config.document_ttl)
    };
    if let Some(CachedValue::Gemtext(text)) = cached {
        debug!(key = %key, "content served from cache");
        return Ok(text);
    }

    info!(key = %key, "content cache miss, fetching upstream");
    let html = state.gateway.fetch_document(slug).await.map_err(|e| {
        warn!(key = %key, error = %e, "document fetch failed");
        e
    })?;

    let (title, date) = extract_metadata(&html);
    let content = html_to_gemtext(&html);
    let date = kind.shows_date().then_some(date.as_str());
    let web_url = state.gateway.document_url(slug);
    let gemtext = render::content_page(&title, date, &content, &web_url);

    state
        .cache
        .lock()
        .await
        .set(key, CachedValue::Gemtext(gemtext.clone()));
    Ok(gemtext)
}

/// Handler for `/`
pub async fn index_handler(state: &AppState) -> Result<Response> {
    let feed = load_feed(state).await?;
    let body = render::index_page(&state.config.blog_name, &state.config.pages, &feed);
    Ok(Response::gemtext(body))
}

/// Handler for `/post/{slug}`
pub async fn post_handler(state: &AppState, slug: &str) -> Result<Response> {
    load_content(state, slug, ContentKind::Post)
        .await
        .map(Response::gemtext)
}

/// Handler for `/page/{slug}`
pub async fn page_handler(state: &AppState, slug: &str) -> Result<Response> {
    load_content(state, slug, ContentKind::Page)
        .await
        .map(Response::gemtext)
}

/// Handler for `/about`
pub async fn about_handler(state: &AppState) -> Result<Response> {
    let feed = load_feed(state).await?;
    let body = render::about_page(
        &state.config.blog_name,
        &feed.description,
        &state.config.upstream_url,
    );
    Ok(Response::gemtext(body))
}

/// Handler for `/feed`
///
/// Links point at the configured Gemini host, else the host the client
/// asked for, else `localhost`.
pub async fn feed_handler(state: &AppState, request_host: Option<&str>) -> Result<Response> {
    let feed = load_feed(state).await?;
    let host = state
        .config
        .gemini_host
        .as_deref()
        .or(request_host)
        .unwrap_or("localhost");
    let base_url = format!("gemini://{}", host);

    let body = render::atom_feed(&state.config.blog_name, &base_url, &feed);
    Ok(Response::with_mime(body, ATOM_MIME))
}

/// Maps a handler result to the response sent on the wire.
pub fn into_response(result: Result<Response>) -> Response {
    result.unwrap_or_else(FetchError::into_response)
}
