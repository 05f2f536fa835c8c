//! Request shaping and response/error normalization.
//!
//! # Design
//! `ApiClient` holds only read-only configuration: the client config, the
//! operation catalog and the notification messages. A call is a pipeline of
//! two pure stages around a transport:
//!
//! 1. `build_request` turns an operation name and body into an `HttpRequest`.
//! 2. The `Transport` executes it.
//! 3. `process_response` / `process_error` turn the outcome into an `ApiResult`.
//!
//! Statuses outside 2xx are routed to the error stage. `call` never fails;
//! setup problems such as an unknown operation become the network-error
//! category.

use serde_json::Value;

use crate::catalog::{OperationDescriptor, ServiceCatalog, ShapeHint};
use crate::config::ClientConfig;
use crate::error::{ClientError, TransportError};
use crate::http::{append_segment, join_url, HttpRequest, HttpResponse};
use crate::messages::Messages;
use crate::progress::Progress;
use crate::result::{ApiResult, ErrorCode};
use crate::transport::Transport;

/// Caller-supplied request shaping.
///
/// Non-empty `params` are attached as query parameters. Otherwise a
/// non-empty `query` is appended to the URL as one more path segment.
/// The two never apply together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub params: Vec<(String, String)>,
    pub query: Option<String>,
}

impl RequestOptions {
    pub fn params<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            params: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            query: None,
        }
    }

    pub fn query(segment: impl Into<String>) -> Self {
        Self {
            params: Vec::new(),
            query: Some(segment.into()),
        }
    }

    /// Derive options from a call body according to the descriptor's hint.
    pub fn from_hint(operation: &str, hint: ShapeHint, body: &Value) -> Result<Self, ClientError> {
        if hint.params {
            return Ok(Self {
                params: params_from_body(operation, body)?,
                query: None,
            });
        }
        if hint.query {
            return Ok(Self {
                params: Vec::new(),
                query: segment_from_body(operation, body)?,
            });
        }
        Ok(Self::default())
    }
}

/// Stateless client for a catalog of operations.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    catalog: ServiceCatalog,
    messages: Messages,
}

impl ApiClient {
    pub fn new(config: ClientConfig, catalog: ServiceCatalog, messages: Messages) -> Self {
        Self {
            config,
            catalog,
            messages,
        }
    }

    /// A client for the built-in catalog with the default messages.
    pub fn with_defaults(config: ClientConfig) -> Self {
        Self::new(config, ServiceCatalog::default(), Messages::default())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Build the request for `operation`, shaping it from the descriptor's hint.
    pub fn build_request(&self, operation: &str, body: &Value) -> Result<HttpRequest, ClientError> {
        let descriptor = self.catalog.get(operation)?;
        let options = RequestOptions::from_hint(operation, descriptor.shape, body)?;
        self.shape_request(descriptor, body, &options)
    }

    /// Build the request for `operation` with explicit shaping options,
    /// ignoring the descriptor's hint.
    pub fn build_request_with(
        &self,
        operation: &str,
        body: &Value,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ClientError> {
        let descriptor = self.catalog.get(operation)?;
        self.shape_request(descriptor, body, options)
    }

    fn shape_request(
        &self,
        descriptor: &OperationDescriptor,
        body: &Value,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ClientError> {
        let mut url = join_url(&self.config.base_url, &descriptor.url);
        let mut query = Vec::new();
        if !options.params.is_empty() {
            query = options.params.clone();
        } else if let Some(segment) = options.query.as_deref().filter(|s| !s.is_empty()) {
            url = append_segment(&url, segment)?;
        }

        let body = if descriptor.method.carries_body() && !body.is_null() {
            Some(serde_json::to_string(body)?)
        } else {
            None
        };

        Ok(HttpRequest {
            method: descriptor.method,
            url,
            query,
            headers: self.config.headers.clone(),
            body,
        })
    }

    /// Normalize a completed 2xx response. Only status 200 is a success.
    pub fn process_response(&self, response: HttpResponse) -> ApiResult {
        let data = parse_body(&response.body);
        if response.status == 200 {
            return ApiResult::Success { data };
        }
        ApiResult::Failure {
            status: response.status,
            msg: data.get("msg").and_then(Value::as_str).map(str::to_string),
            code: data.get("code").cloned(),
        }
    }

    /// Normalize a transport failure into one of the three error categories.
    pub fn process_error(&self, error: &TransportError) -> ApiResult {
        match error {
            TransportError::Response { status, .. } => {
                log::error!("error in response: {error}");
                ApiResult::Error {
                    msg: self.messages.response_failure.clone(),
                    code: ErrorCode::Status(*status),
                }
            }
            TransportError::Request { reason } => {
                log::warn!("error in request: {reason}");
                ApiResult::Error {
                    msg: self.messages.request_failure.clone(),
                    code: ErrorCode::Empty,
                }
            }
            TransportError::Setup { reason } => {
                log::warn!("error in network: {reason}");
                ApiResult::Error {
                    msg: self.messages.network_error.clone(),
                    code: ErrorCode::Empty,
                }
            }
        }
    }

    /// Run `operation` through `transport` and normalize the outcome.
    pub fn call<T: Transport + ?Sized>(
        &self,
        transport: &T,
        operation: &str,
        body: &Value,
        mut progress: Progress<'_>,
    ) -> ApiResult {
        let request = self.build_request(operation, body);
        self.finish(transport, operation, request, &mut progress)
    }

    /// Like `call`, with explicit shaping options.
    pub fn call_with<T: Transport + ?Sized>(
        &self,
        transport: &T,
        operation: &str,
        body: &Value,
        options: &RequestOptions,
        mut progress: Progress<'_>,
    ) -> ApiResult {
        let request = self.build_request_with(operation, body, options);
        self.finish(transport, operation, request, &mut progress)
    }

    fn finish<T: Transport + ?Sized>(
        &self,
        transport: &T,
        operation: &str,
        request: Result<HttpRequest, ClientError>,
        progress: &mut Progress<'_>,
    ) -> ApiResult {
        match dispatch(transport, operation, request, progress) {
            Ok(response) => self.process_response(response),
            Err(err) => self.process_error(&err),
        }
    }
}

fn dispatch<T: Transport + ?Sized>(
    transport: &T,
    operation: &str,
    request: Result<HttpRequest, ClientError>,
    progress: &mut Progress<'_>,
) -> Result<HttpResponse, TransportError> {
    let request = request?;
    log::debug!("{operation}: {} {}", request.method, request.url);
    let response = transport.execute(&request, progress)?;
    log::debug!("{operation}: status {}", response.status);
    if !response.is_success_range() {
        return Err(TransportError::Response {
            status: response.status,
            body: response.body,
        });
    }
    Ok(response)
}

/// Parse a body as JSON; non-JSON bodies are kept as a string.
fn parse_body(body: &str) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn params_from_body(operation: &str, body: &Value) -> Result<Vec<(String, String)>, ClientError> {
    match body {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => Ok(map
            .iter()
            .filter_map(|(key, value)| scalar_text(value).map(|text| (key.clone(), text)))
            .collect()),
        other => Err(ClientError::InvalidParams {
            operation: operation.to_string(),
            found: describe(other).to_string(),
        }),
    }
}

/// A string or number body is the segment itself; an object contributes its
/// `_id` or `id` field.
fn segment_from_body(operation: &str, body: &Value) -> Result<Option<String>, ClientError> {
    let invalid = || ClientError::InvalidPathSegment {
        operation: operation.to_string(),
        found: describe(body).to_string(),
    };
    match body {
        Value::Null => Ok(None),
        Value::String(_) | Value::Number(_) => Ok(scalar_text(body)),
        Value::Object(map) => map
            .get("_id")
            .or_else(|| map.get("id"))
            .filter(|id| id.is_string() || id.is_number())
            .map(scalar_text)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

/// Text form of a query value. Nulls are dropped; arrays and objects are
/// sent as JSON text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
