//! API Module
//!
//! Gemini handlers, routing and page rendering for the capsule.
//!
//! # Routes
//! - `/` - Landing page with recent posts
//! - `/about` - About page
//! - `/feed` - Atom feed
//! - `/post/{slug}` - Blog post
//! - `/page/{slug}` - Static page

pub mod handlers;
pub mod render;
pub mod routes;

pub use handlers::*;
pub use routes::dispatch;
