//! Executing `HttpRequest`s.
//!
//! # Design
//! `Transport` is the seam between the pure request/response stages of
//! `ApiClient` and the network. A transport returns the raw response for
//! every status code; `ApiClient` decides which statuses count as errors.
//! Failures without a response are classified here: a request that went
//! out but got no reply is `TransportError::Request`, anything that stopped
//! it from going out is `TransportError::Setup`.

use std::fmt;
use std::io::Read;
use std::time::Duration;

use ureq::typestate::WithBody;
use ureq::{RequestBuilder, SendBody};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::progress::{Direction, Progress, ProgressReader};

/// Executes a request and returns the raw response.
pub trait Transport {
    /// Send `request`, reporting body transfer through `progress`.
    ///
    /// Returns `Ok` for any HTTP status the server sends; status validation
    /// happens in the client.
    fn execute(
        &self,
        request: &HttpRequest,
        progress: &mut Progress<'_>,
    ) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a `ureq` agent.
///
/// The agent is built once with a global timeout covering connect, send and
/// receive. It is `Send + Sync` and can be shared between threads.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(
        &self,
        request: &HttpRequest,
        progress: &mut Progress<'_>,
    ) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let sent = match request.method {
            HttpMethod::Get => decorate(self.agent.get(url), request).call(),
            HttpMethod::Delete => decorate(self.agent.delete(url), request).call(),
            HttpMethod::Post => send(decorate(self.agent.post(url), request), request, progress),
            HttpMethod::Put => send(decorate(self.agent.put(url), request), request, progress),
            HttpMethod::Patch => send(decorate(self.agent.patch(url), request), request, progress),
        };
        let mut response = sent.map_err(classify)?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let total = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<u64>().ok());

        let mut bytes = Vec::new();
        ProgressReader::new(
            response.body_mut().as_reader(),
            total,
            Direction::Download,
            progress,
        )
        .read_to_end(&mut bytes)
        .map_err(|e| TransportError::Request {
            reason: format!("reading response body: {e}"),
        })?;

        Ok(HttpResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

fn decorate<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (key, value) in &request.query {
        builder = builder.query(key, value);
    }
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    request: &HttpRequest,
    progress: &mut Progress<'_>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match request.body.as_deref() {
        Some(body) => {
            let total = Some(body.len() as u64);
            let mut reader = ProgressReader::new(body.as_bytes(), total, Direction::Upload, progress);
            builder.send(SendBody::from_reader(&mut reader))
        }
        None => builder.send_empty(),
    }
}

/// Sort a ureq failure into "sent but unanswered" or "never sent".
///
/// Redirect and protocol failures happen after the request went out, so they
/// count as unanswered.
fn classify(err: ureq::Error) -> TransportError {
    match &err {
        ureq::Error::StatusCode(status) => TransportError::Response {
            status: *status,
            body: String::new(),
        },
        ureq::Error::Timeout(_)
        | ureq::Error::Io(_)
        | ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound
        | ureq::Error::TooManyRedirects
        | ureq::Error::RedirectFailed
        | ureq::Error::Protocol(_) => TransportError::Request {
            reason: err.to_string(),
        },
        _ => TransportError::Setup {
            reason: err.to_string(),
        },
    }
}
