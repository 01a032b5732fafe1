//! Shapes a `ValidationOutcome` into status, headers and a JSON body.

use serde::Serialize;

use crate::outcome::{
    ValidationOutcome, INTERNAL_ERROR_MESSAGE, METHOD_NOT_ALLOWED_MESSAGE, SUCCESS_MESSAGE,
};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

/// Body of the 500 response, spelled out so it can be produced without
/// going through the serializer.
const INTERNAL_ERROR_BODY: &str = r#"{"error":"Internal server error."}"#;

/// An HTTP response described as plain data, independent of any server
/// framework. `headers` always contains `Content-Type: application/json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HandlerResponse {
    fn json<T: Serialize>(status: u16, body: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::with_json_body(status, serde_json::to_string(body)?))
    }

    fn with_json_body(status: u16, body: String) -> Self {
        Self {
            status,
            headers: vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
            body,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuccessBody<'a> {
    message: &'a str,
    full_name: &'a str,
}

/// Map an outcome to its response.
///
/// | outcome          | status | body                       |
/// |------------------|--------|----------------------------|
/// | Valid            | 200    | `{"message", "fullName"}`  |
/// | BadRequest       | 400    | `{"error"}` per reason     |
/// | MethodNotAllowed | 405    | `{"error"}`                |
/// | InternalError    | 500    | `{"error"}` (generic)      |
pub fn build_response(outcome: &ValidationOutcome) -> Result<HandlerResponse, serde_json::Error> {
    let status = outcome.status();
    match outcome {
        ValidationOutcome::Valid { full_name } => HandlerResponse::json(
            status,
            &SuccessBody {
                message: SUCCESS_MESSAGE,
                full_name,
            },
        ),
        ValidationOutcome::BadRequest(reason) => HandlerResponse::json(
            status,
            &ErrorBody {
                error: reason.message(),
            },
        ),
        ValidationOutcome::MethodNotAllowed => HandlerResponse::json(
            status,
            &ErrorBody {
                error: METHOD_NOT_ALLOWED_MESSAGE,
            },
        ),
        ValidationOutcome::InternalError { .. } => Ok(internal_error_response()),
    }
}

/// The 500 response. Infallible, so it can be the last resort at the
/// entrypoint boundary.
pub fn internal_error_response() -> HandlerResponse {
    HandlerResponse::with_json_body(500, INTERNAL_ERROR_BODY.to_string())
}
