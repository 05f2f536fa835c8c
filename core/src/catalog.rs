//! Operation descriptors and the catalog mapping operation names to them.
//!
//! # Design
//! A catalog is read-only once built. The built-in blog service table comes
//! from `Operation`; other tables load from JSON in the same shape:
//!
//! ```json
//! { "getPostById": { "url": "post", "method": "GET", "responseType": { "query": true } } }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::http::HttpMethod;
use crate::operation::Operation;

/// How a call's body is turned into request parameters.
///
/// `params`: the body object becomes query parameters.
/// `query`: the body scalar (or the object's id) becomes a trailing path segment.
/// Neither: the body is sent as the request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeHint {
    #[serde(default)]
    pub params: bool,
    #[serde(default)]
    pub query: bool,
}

impl ShapeHint {
    pub const BODY: ShapeHint = ShapeHint {
        params: false,
        query: false,
    };
    pub const PARAMS: ShapeHint = ShapeHint {
        params: true,
        query: false,
    };
    pub const QUERY: ShapeHint = ShapeHint {
        params: false,
        query: true,
    };
}

/// Static description of one API operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub method: HttpMethod,
    /// Relative to the client's base URL.
    pub url: String,
    #[serde(default, rename = "responseType")]
    pub shape: ShapeHint,
}

impl OperationDescriptor {
    pub fn new(method: HttpMethod, url: &str, shape: ShapeHint) -> Self {
        Self {
            method,
            url: url.to_string(),
            shape,
        }
    }
}

/// Read-only mapping from operation name to descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceCatalog {
    operations: BTreeMap<String, OperationDescriptor>,
}

impl ServiceCatalog {
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn get(&self, name: &str) -> Result<&OperationDescriptor, ClientError> {
        self.operations
            .get(name)
            .ok_or_else(|| ClientError::UnknownOperation(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Operation names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OperationDescriptor)> {
        self.operations.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Operation::ALL.iter().map(|op| (op.name(), op.descriptor())).collect()
    }
}

impl<'a> FromIterator<(&'a str, OperationDescriptor)> for ServiceCatalog {
    fn from_iter<I: IntoIterator<Item = (&'a str, OperationDescriptor)>>(iter: I) -> Self {
        Self {
            operations: iter
                .into_iter()
                .map(|(name, descriptor)| (name.to_string(), descriptor))
                .collect(),
        }
    }
}
