//! Error types for the proxy
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::gemini::Response;

// == Fetch Error Enum ==
/// Failure of a single upstream fetch.
///
/// Every upstream outcome folds into one of two variants: the resource is
/// permanently absent, or the upstream (or the network path to it) is
/// misbehaving and the client may retry later.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Upstream answered 404
    #[error("{0}")]
    NotFound(String),

    /// Upstream answered another 4xx/5xx, or the request never completed
    #[error("{0}")]
    Server(String),
}

impl FetchError {
    /// Wraps a transport-level failure.
    pub fn network(err: impl std::fmt::Display) -> Self {
        FetchError::Server(format!("Network error: {}", err))
    }

    // == Into Response ==
    /// Translates the failure into the Gemini status the client sees.
    ///
    /// - `NotFound` -> 51 (permanent)
    /// - `Server` -> 40 (temporary)
    pub fn into_response(self) -> Response {
        match self {
            FetchError::NotFound(msg) => Response::not_found(msg),
            FetchError::Server(msg) => Response::temporary_failure(msg),
        }
    }
}

// == Config Error Enum ==
/// Errors raised while loading configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be used
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    /// The config file exists but cannot be read or parsed
    #[error("failed to load config file {path}: {reason}")]
    File { path: String, reason: String },
}

// == Result Type Alias ==
/// Convenience Result type for upstream fetches.
pub type Result<T> = std::result::Result<T, FetchError>;
