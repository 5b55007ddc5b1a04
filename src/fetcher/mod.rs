//! Fetcher Module
//!
//! Upstream retrieval of the blog's feed and HTML documents.

mod feed;
mod gateway;

pub use feed::{iso_timestamp, Feed, FeedEntry};
pub use gateway::{classify, FetchGateway};
