//! Normalizing HTTP client for the blog service API.
//!
//! # Overview
//! Every configured operation is callable by name and returns one
//! `ApiResult`: a success carrying the response body, a failure for other
//! 2xx replies, or an error in one of three categories (server replied with
//! an error status, no reply arrived, request could not be set up).
//!
//! # Design
//! - `ApiClient` is stateless apart from read-only configuration. Request
//!   shaping (`build_request`) and normalization (`process_response`,
//!   `process_error`) are pure functions around a `Transport`.
//! - Operations come from a `ServiceCatalog`. The built-in catalog is
//!   generated from the `Operation` table, which also gives `Api` one named
//!   method per operation.
//! - Calls never return `Err` or panic; the caller branches on the result.
//! - `api::init` builds one process-wide `Api` that is read-only afterwards.

pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod messages;
pub mod operation;
pub mod progress;
pub mod result;
pub mod transport;

pub use api::Api;
pub use catalog::{OperationDescriptor, ServiceCatalog, ShapeHint};
pub use client::{ApiClient, RequestOptions};
pub use config::ClientConfig;
pub use error::{ClientError, ConfigError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use messages::{Messages, Notification};
pub use operation::Operation;
pub use progress::{percent_completed, Progress};
pub use result::{ApiResult, ErrorCode};
pub use transport::{Transport, UreqTransport};
