//! Gemini Routes
//!
//! Maps request paths onto handlers.
//!
//! # Routes
//! - `/` - Landing page
//! - `/about` - About page built from the feed
//! - `/feed` - Atom feed with gemini:// links
//! - `/post/{slug}` - Blog post
//! - `/page/{slug}` - Static page

use crate::api::handlers::{
    about_handler, feed_handler, index_handler, into_response, page_handler, post_handler,
    AppState,
};
use crate::gemini::{Request, Response};

/// Routes a parsed request and always produces a response.
///
/// Upstream failures are translated here; unknown paths answer 51.
pub async fn dispatch(state: &AppState, request: &Request) -> Response {
    let segments: Vec<&str> = request.path().trim_matches('/').split('/').collect();

    let result = match segments.as_slice() {
        [""] => index_handler(state).await,
        ["about"] => about_handler(state).await,
        ["feed"] => feed_handler(state, request.hostname()).await,
        ["post", slug] if !slug.is_empty() => post_handler(state, slug).await,
        ["page", slug] if !slug.is_empty() => page_handler(state, slug).await,
        _ => Ok(Response::not_found(format!("No route for {}", request.path()))),
    };

    into_response(result)
}
