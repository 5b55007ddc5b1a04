//! gemproxy - A Gemini proxy for Bearblog sites
//!
//! Fetches a blog's RSS feed and HTML pages, converts them to gemtext and
//! serves them over Gemini, with a TTL cache in front of every upstream fetch.

pub mod admin;
pub mod api;
pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod fetcher;
pub mod gemini;
pub mod models;

pub use api::AppState;
pub use config::Config;
pub use error::{ConfigError, FetchError};
