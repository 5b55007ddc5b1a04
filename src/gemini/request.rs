//! Gemini requests
//!
//! A request is a single absolute URL terminated by CRLF.

use thiserror::Error;
use url::Url;

/// Longest URL a client may send, excluding the CRLF
pub const MAX_REQUEST_LEN: usize = 1024;

/// Reasons a request line is rejected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    #[error("Request exceeds 1024 bytes")]
    TooLong,

    #[error("Request is not terminated by CRLF")]
    Unterminated,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),
}

/// A parsed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    url: Url,
}

impl Request {
    /// Parses a raw request line, CRLF included.
    pub fn parse(line: &str) -> Result<Self, RequestError> {
        let raw = match line.strip_suffix("\r\n") {
            Some(raw) => raw,
            None if line.len() > MAX_REQUEST_LEN => return Err(RequestError::TooLong),
            None => return Err(RequestError::Unterminated),
        };
        if raw.len() > MAX_REQUEST_LEN {
            return Err(RequestError::TooLong);
        }

        let url = Url::parse(raw).map_err(|e| RequestError::InvalidUrl(e.to_string()))?;
        if url.scheme() != "gemini" {
            return Err(RequestError::UnsupportedScheme(url.scheme().to_string()));
        }
        Ok(Self { url })
    }

    /// Path component, `/` when the URL has none.
    pub fn path(&self) -> &str {
        match self.url.path() {
            "" => "/",
            path => path,
        }
    }

    pub fn hostname(&self) -> Option<&str> {
        self.url.host_str()
    }
}
