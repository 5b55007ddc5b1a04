//! Gemini responses
//!
//! A response is a `<status> <meta>\r\n` header, followed by a body for
//! success statuses only.

/// MIME type of gemtext bodies
pub const GEMTEXT_MIME: &str = "text/gemini; charset=utf-8";

/// Status codes the proxy emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    TemporaryFailure,
    NotFound,
    BadRequest,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Success => 20,
            Status::TemporaryFailure => 40,
            Status::NotFound => 51,
            Status::BadRequest => 59,
        }
    }
}

/// A complete Gemini response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    /// MIME type on success, human-readable message otherwise
    pub meta: String,
    pub body: Option<String>,
}

impl Response {
    /// A gemtext document.
    pub fn gemtext(body: impl Into<String>) -> Self {
        Self::with_mime(body, GEMTEXT_MIME)
    }

    pub fn with_mime(body: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            meta: mime.into(),
            body: Some(body.into()),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::failure(Status::NotFound, message)
    }

    pub fn temporary_failure(message: impl Into<String>) -> Self {
        Self::failure(Status::TemporaryFailure, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::failure(Status::BadRequest, message)
    }

    fn failure(status: Status, message: impl Into<String>) -> Self {
        // Meta is a single header line
        let message: String = message.into();
        let meta = message.replace(['\r', '\n'], " ");
        Self {
            status,
            meta,
            body: None,
        }
    }

    // == Encode ==
    /// Serializes the response to wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!("{} {}\r\n", self.status.code(), self.meta).into_bytes();
        if let Some(body) = &self.body {
            out.extend_from_slice(body.as_bytes());
        }
        out
    }
}
