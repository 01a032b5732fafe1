//! Payload and response types for the name endpoint.
//!
//! # Design
//! These mirror the handler's wire schema but are defined independently so
//! the client does not link against the server. The contract tests catch
//! any drift between the two.

use serde::{Deserialize, Serialize};

/// Request payload. Absent names are omitted from the JSON entirely, which
/// is how the "missing first name" and "missing last name" scenarios are
/// expressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRequest {
    #[serde(rename = "FirstName", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "LastName", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl NameRequest {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
        }
    }

    pub fn first_name_only(first_name: &str) -> Self {
        Self {
            first_name: Some(first_name.to_string()),
            last_name: None,
        }
    }

    pub fn last_name_only(last_name: &str) -> Self {
        Self {
            first_name: None,
            last_name: Some(last_name.to_string()),
        }
    }
}

/// 200 response body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgment {
    pub message: String,
    pub full_name: String,
}

/// Body of every non-200 response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Outcome of one client call, captured for assertions and logging.
///
/// Transport failures are represented here too (status 500, `is_success`
/// false, `body` holding the error description), so callers never have to
/// handle a `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status_code: u16,
    pub body: String,
    pub is_success: bool,
    pub request_body_sent: String,
    pub headers: Vec<(String, String)>,
}

impl ApiResponse {
    pub fn new(status_code: u16, body: String, request_body_sent: String) -> Self {
        Self {
            status_code,
            body,
            is_success: (200..300).contains(&status_code),
            request_body_sent,
            headers: Vec::new(),
        }
    }

    pub fn transport_failure(message: String, request_body_sent: String) -> Self {
        Self::new(500, message, request_body_sent)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Deserialize the body as `T`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}
