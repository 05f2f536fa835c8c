//! Error types for the API client.
//!
//! # Design
//! These errors never reach application code directly: `ApiClient::call`
//! folds every one of them into an `ApiResult`. `TransportError` mirrors the
//! three error categories of the result shape. A response with a status
//! outside 2xx, a request that got no reply, and a request that could not be
//! set up. `ClientError` covers the setup stage before anything is sent and
//! converts into `TransportError::Setup`.

use thiserror::Error;

/// Failures while turning an operation name and body into an `HttpRequest`,
/// or while loading a catalog.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The operation name is not present in the catalog.
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    /// The catalog names an HTTP method this client does not support.
    #[error("unsupported HTTP method '{0}'")]
    UnsupportedMethod(String),

    /// A path-segment operation was called with a body that is not a string
    /// or number.
    #[error("operation '{operation}' expects a string or number path segment, got {found}")]
    InvalidPathSegment { operation: String, found: String },

    /// A query-parameter operation was called with a body that is not an object.
    #[error("operation '{operation}' expects an object of query parameters, got {found}")]
    InvalidParams { operation: String, found: String },

    /// The joined URL cannot take a path segment.
    #[error("cannot append a path segment to '{0}'")]
    InvalidUrl(String),

    /// The request body or a catalog document could not be (de)serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures reported by a `Transport` or by status validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server replied with a status outside 2xx. `body` is kept for
    /// diagnostics.
    #[error("server responded with status {status}{}", excerpt(.body))]
    Response { status: u16, body: String },

    /// The request was sent but no response arrived.
    #[error("no response received: {reason}")]
    Request { reason: String },

    /// The request failed before it was dispatched.
    #[error("request setup failed: {reason}")]
    Setup { reason: String },
}

const EXCERPT_CHARS: usize = 200;

/// `": <body>"`, cut to `EXCERPT_CHARS` characters, or nothing for an empty body.
fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return String::new();
    }
    match body.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!(": {}...", &body[..cut]),
        None => format!(": {body}"),
    }
}

impl From<ClientError> for TransportError {
    fn from(err: ClientError) -> Self {
        TransportError::Setup {
            reason: err.to_string(),
        }
    }
}

/// Invalid client configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("base URL must not be empty")]
    EmptyBaseUrl,

    #[error("invalid timeout '{value}': {source}")]
    InvalidTimeout {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}
