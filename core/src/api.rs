//! The callable API surface and the process-wide instance.
//!
//! `Api` pairs an `ApiClient` with a transport. Every catalog key can be
//! called by name through `Api::call`; the built-in operations also get one
//! named method each (see `operation.rs`).

use std::sync::OnceLock;

use serde_json::Value;

use crate::client::{ApiClient, RequestOptions};
use crate::config::ClientConfig;
use crate::progress::Progress;
use crate::result::ApiResult;
use crate::transport::{Transport, UreqTransport};

static GLOBAL: OnceLock<Api> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Api<T = UreqTransport> {
    client: ApiClient,
    transport: T,
}

impl Api<UreqTransport> {
    /// Built-in catalog and messages over a `ureq` transport using the
    /// configured timeout.
    pub fn from_config(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::new(ApiClient::with_defaults(config), transport)
    }
}

impl<T: Transport> Api<T> {
    pub fn new(client: ApiClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Names accepted by `call`.
    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.client.catalog().names()
    }

    /// Call the operation registered under `operation`.
    ///
    /// Each call issues its own request; nothing is cached or retried.
    pub fn call(&self, operation: &str, body: &Value, progress: Progress<'_>) -> ApiResult {
        self.client.call(&self.transport, operation, body, progress)
    }

    pub fn call_with(
        &self,
        operation: &str,
        body: &Value,
        options: &RequestOptions,
        progress: Progress<'_>,
    ) -> ApiResult {
        self.client
            .call_with(&self.transport, operation, body, options, progress)
    }
}

/// Initialize the process-wide `Api` from `config`.
///
/// Only the first call builds the instance; later calls return it unchanged
/// and ignore their `config`.
pub fn init(config: ClientConfig) -> &'static Api {
    let mut built = false;
    let api = GLOBAL.get_or_init(|| {
        built = true;
        log::debug!(
            "initializing api for {} with timeout {:?}",
            config.base_url,
            config.timeout
        );
        Api::from_config(config)
    });
    if !built {
        log::warn!("api already initialized; ignoring new configuration");
    }
    api
}

/// The process-wide `Api`, if `init` has run.
pub fn global() -> Option<&'static Api> {
    GLOBAL.get()
}
