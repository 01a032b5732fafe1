//! Request payload and the pure validation step.

use serde::Deserialize;

use crate::outcome::{BadRequestReason, ValidationOutcome};

/// Wire payload. Both names are optional at the wire level; required-ness is
/// enforced by `validate`, not by deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NameRequest {
    #[serde(rename = "FirstName")]
    pub first_name: Option<String>,
    #[serde(rename = "LastName")]
    pub last_name: Option<String>,
}

/// Classify a raw `(method, body)` pair. No side effects.
///
/// The method check comes first, so a non-POST is rejected whatever its
/// body. A JSON `null` body deserializes to "no request" and is reported as
/// missing fields rather than malformed input.
pub fn validate(method: &str, body: Option<&str>) -> ValidationOutcome {
    if !method.eq_ignore_ascii_case("POST") {
        return ValidationOutcome::MethodNotAllowed;
    }

    let body = match body {
        Some(body) if !body.is_empty() => body,
        _ => return ValidationOutcome::BadRequest(BadRequestReason::EmptyBody),
    };

    let request: Option<NameRequest> = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => {
            return ValidationOutcome::BadRequest(BadRequestReason::MalformedJson {
                detail: e.to_string(),
            })
        }
    };
    let request = request.unwrap_or_default();

    match (present(request.first_name), present(request.last_name)) {
        (Some(first), Some(last)) => ValidationOutcome::Valid {
            full_name: format!("{first} {last}"),
        },
        _ => ValidationOutcome::BadRequest(BadRequestReason::MissingFields),
    }
}

/// A name counts as present when it has at least one non-whitespace char.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
