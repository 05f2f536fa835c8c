//! The discriminated result returned by every API call.
//!
//! # Design
//! `ApiResult` is an enum, so exactly one of success/failure/error is active
//! and no variant can carry fields of another. `Serialize` writes the flat
//! wire shape application code branches on:
//!
//! - `{ "isSuccess": true, "data": ... }`
//! - `{ "isFailure": true, "status": 201, "msg": ..., "code": ... }`
//! - `{ "isError": true, "msg": {...}, "code": 404 | "" }`
//!
//! Absent `Failure` fields are omitted rather than written as `null`.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use crate::messages::Notification;

/// The `code` of an `ApiResult::Error`: the HTTP status for response
/// errors, empty for the other two categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Status(u16),
    Empty,
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ErrorCode::Status(status) => serializer.serialize_u16(*status),
            ErrorCode::Empty => serializer.serialize_str(""),
        }
    }
}

/// Outcome of one API call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult {
    /// The server answered 200. `data` is the response body, parsed as JSON
    /// when possible and kept as a string otherwise.
    Success { data: Value },

    /// The server answered with a 2xx status other than 200.
    Failure {
        status: u16,
        msg: Option<String>,
        code: Option<Value>,
    },

    /// The transport failed; `msg` is one of the three catalog notifications.
    Error { msg: Notification, code: ErrorCode },
}

impl ApiResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResult::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ApiResult::Failure { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ApiResult::Error { .. })
    }

    /// The response body of a successful call.
    pub fn data(&self) -> Option<&Value> {
        match self {
            ApiResult::Success { data } => Some(data),
            _ => None,
        }
    }

    /// Serialize into the wire shape described in the module docs.
    pub fn to_json(&self) -> Value {
        // Serializing into a Value cannot fail: every map key is a string.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for ApiResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ApiResult::Success { data } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("isSuccess", &true)?;
                map.serialize_entry("data", data)?;
                map.end()
            }
            ApiResult::Failure { status, msg, code } => {
                let len = 2 + usize::from(msg.is_some()) + usize::from(code.is_some());
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("isFailure", &true)?;
                map.serialize_entry("status", status)?;
                if let Some(msg) = msg {
                    map.serialize_entry("msg", msg)?;
                }
                if let Some(code) = code {
                    map.serialize_entry("code", code)?;
                }
                map.end()
            }
            ApiResult::Error { msg, code } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("isError", &true)?;
                map.serialize_entry("msg", msg)?;
                map.serialize_entry("code", code)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::messages::Messages;

    #[test]
    fn success_serializes_to_flat_shape() {
        let result = ApiResult::Success {
            data: json!({"title": "Hello"}),
        };
        assert_eq!(
            result.to_json(),
            json!({"isSuccess": true, "data": {"title": "Hello"}})
        );
    }

    #[test]
    fn failure_omits_absent_fields() {
        let result = ApiResult::Failure {
            status: 201,
            msg: None,
            code: None,
        };
        assert_eq!(result.to_json(), json!({"isFailure": true, "status": 201}));

        let result = ApiResult::Failure {
            status: 202,
            msg: Some("queued".to_string()),
            code: Some(json!("Q1")),
        };
        assert_eq!(
            result.to_json(),
            json!({"isFailure": true, "status": 202, "msg": "queued", "code": "Q1"})
        );
    }

    #[test]
    fn error_code_is_number_or_empty_string() {
        let messages = Messages::default();
        let result = ApiResult::Error {
            msg: messages.response_failure.clone(),
            code: ErrorCode::Status(404),
        };
        let value = result.to_json();
        assert_eq!(value["isError"], true);
        assert_eq!(value["code"], 404);
        assert_eq!(value["msg"]["title"], "Error");

        let result = ApiResult::Error {
            msg: messages.request_failure.clone(),
            code: ErrorCode::Empty,
        };
        assert_eq!(result.to_json()["code"], "");
    }

    #[test]
    fn exactly_one_discriminant_is_set() {
        let messages = Messages::default();
        let results = [
            ApiResult::Success { data: Value::Null },
            ApiResult::Failure {
                status: 204,
                msg: None,
                code: None,
            },
            ApiResult::Error {
                msg: messages.network_error.clone(),
                code: ErrorCode::Empty,
            },
        ];
        for result in &results {
            let flags = [result.is_success(), result.is_failure(), result.is_error()];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{result:?}");

            let value = result.to_json();
            let keys = ["isSuccess", "isFailure", "isError"]
                .iter()
                .filter(|k| value.get(**k).is_some())
                .count();
            assert_eq!(keys, 1, "{value}");
        }
    }
}
