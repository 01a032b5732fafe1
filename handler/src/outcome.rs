//! The tagged result of validating a single invocation.
//!
//! # Design
//! Client-input problems are outcome variants rather than Rust errors: the
//! handler always answers, so a bad request is a value to be shaped into a
//! response, not a failure to be propagated. Exactly one outcome is produced
//! per request and it is consumed once by `response::build_response`.

pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed. Only POST requests are supported.";
pub const EMPTY_BODY_MESSAGE: &str = "Request body is required.";
pub const MALFORMED_JSON_MESSAGE: &str = "Invalid JSON format in request body.";
pub const MISSING_FIELDS_MESSAGE: &str = "Both firstname and lastname are required.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";
pub const SUCCESS_MESSAGE: &str = "Request processed successfully";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Both names were present; `full_name` is `first + " " + last`.
    Valid { full_name: String },

    /// The request was a POST but its body could not be accepted.
    BadRequest(BadRequestReason),

    /// Any method other than POST.
    MethodNotAllowed,

    /// Validation or response shaping failed unexpectedly. `message` is for
    /// logs only and never reaches the caller.
    InternalError { message: String },
}

/// Why a POST was rejected with 400. Each reason keeps its own message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadRequestReason {
    EmptyBody,
    MissingFields,
    MalformedJson { detail: String },
}

impl BadRequestReason {
    pub fn message(&self) -> &'static str {
        match self {
            BadRequestReason::EmptyBody => EMPTY_BODY_MESSAGE,
            BadRequestReason::MissingFields => MISSING_FIELDS_MESSAGE,
            BadRequestReason::MalformedJson { .. } => MALFORMED_JSON_MESSAGE,
        }
    }
}

impl ValidationOutcome {
    /// HTTP status the outcome maps to.
    pub fn status(&self) -> u16 {
        match self {
            ValidationOutcome::Valid { .. } => 200,
            ValidationOutcome::BadRequest(_) => 400,
            ValidationOutcome::MethodNotAllowed => 405,
            ValidationOutcome::InternalError { .. } => 500,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid { .. })
    }
}
