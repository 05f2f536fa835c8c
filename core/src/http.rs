//! HTTP request and response types passed between the client and a transport.
//!
//! # Design
//! Requests and responses are plain data. `ApiClient` builds `HttpRequest`
//! values and normalizes `HttpResponse` values without touching the network;
//! a `Transport` executes the round-trip in between. All fields are owned so
//! values can be logged, stored in test vectors, or moved across threads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::error::ClientError;

/// HTTP method of an operation.
///
/// Serializes upper-case; deserializes through `FromStr`, so catalogs may
/// spell methods in any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether a request with this method carries the caller's body.
    ///
    /// GET and DELETE never do; DELETE bodies are always sent empty.
    pub fn carries_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(ClientError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// An HTTP request described as plain data.
///
/// Built by `ApiClient::build_request`. `url` is absolute and already has any
/// path segment appended; `query` holds unencoded pairs that the transport
/// encodes onto the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data, for any status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// True for statuses a transport treats as a completed exchange (2xx).
    pub fn is_success_range(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Join a base URL and a relative URL with exactly one `/` between them.
///
/// An empty relative URL returns the base unchanged.
pub fn join_url(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}

/// Append `segment` to the path of `url` as exactly one path segment.
///
/// Reserved characters in the segment (`/`, `?`, `#`, spaces, non-ASCII) are
/// percent-encoded, so the segment can never change the path structure or
/// start a query string.
pub fn append_segment(url: &str, segment: &str) -> Result<String, ClientError> {
    let invalid = || ClientError::InvalidUrl(url.to_string());
    let mut parsed = Url::parse(url).map_err(|_| invalid())?;
    parsed
        .path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .push(segment);
    Ok(parsed.into())
}
