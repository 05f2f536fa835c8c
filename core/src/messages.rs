//! User-facing notifications placed in `ApiResult::Error` values.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// A title and message shown to the user when a call errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
        }
    }
}

/// One notification per error category, used verbatim in results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Messages {
    pub response_failure: Notification,
    pub request_failure: Notification,
    pub network_error: Notification,
}

impl Messages {
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            response_failure: Notification::new(
                "Error",
                "An error occured while fetching response from the server. Please try again",
            ),
            request_failure: Notification::new(
                "Error",
                "An error occurred while parsing request data",
            ),
            network_error: Notification::new(
                "Error",
                "Unable to connect with the server. Please check internet connectivity and try again later",
            ),
        }
    }
}
