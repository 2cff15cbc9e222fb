//! Error types for resource synchronization.
//!
//! Two layers:
//!
//! * [`FetchError`] — what a single request resolved to.  Cheap to clone so it
//!   can live inside a [`ViewState`](crate::ViewState); every variant carries a
//!   non-empty, display-ready message.
//! * [`ClientError`] — setup failures (configuration, building the HTTP
//!   client).  These surface before any view is mounted.

use serde_json::Value;
use thiserror::Error;

/// Coarse classification of a [`FetchError`], for callers that need to branch
/// on the cause rather than just display it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not complete (connection refused, timeout, abort).
    Network,
    /// The server answered with a non-2xx status.
    Server,
    /// The body could not be encoded or decoded as the expected JSON.
    Decode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{message}")]
    Network { message: String },

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{message}")]
    Decode { message: String },
}

const GENERIC_NETWORK_MESSAGE: &str = "Network request failed";
const GENERIC_DECODE_MESSAGE: &str = "Response could not be decoded";

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: non_empty(message.into(), GENERIC_NETWORK_MESSAGE),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: non_empty(message.into(), GENERIC_DECODE_MESSAGE),
        }
    }

    /// Build a server error from a status code and the raw response body.
    ///
    /// The body's `message` field (or `error`, as some endpoints use) wins;
    /// otherwise a generic description of the status is used.
    pub fn server(status: u16, body: &[u8]) -> Self {
        let message = extract_message(body)
            .unwrap_or_else(|| format!("Request failed with status {status}"));
        Self::Server { status, message }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Server { .. } => ErrorKind::Server,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Network { message } | Self::Server { message, .. } | Self::Decode { message } => {
                message
            }
        }
    }

    /// HTTP status, for server errors only.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull a human-readable message out of a JSON error body.
pub(crate) fn extract_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

fn non_empty(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// Failures while setting the client up.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
