//! Gemini Module
//!
//! Request parsing, response encoding and the listener for the Gemini protocol.

mod request;
mod response;
mod server;

pub use request::{Request, RequestError, MAX_REQUEST_LEN};
pub use response::{Response, Status, GEMTEXT_MIME};
pub use server::{handle_connection, serve, REQUEST_TIMEOUT};
