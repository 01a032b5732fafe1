//! The single externally invoked operation: validate, shape, log.
//!
//! # Design
//! `handle` is stateless and can be called from any number of tasks at
//! once. Everything that could go wrong while producing a response is
//! caught here, including panics, and turned into the generic 500 response;
//! nothing escapes to the caller.

use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, info, info_span};
use uuid::Uuid;

use crate::outcome::{BadRequestReason, ValidationOutcome};
use crate::request::validate;
use crate::response::{build_response, internal_error_response, HandlerResponse};

/// Optional routing header. Accepted and logged, never acted upon.
pub const MARKET_ID_HEADER: &str = "X-Market-Id";

/// One invocation as plain data, whatever transport delivered it.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl InvocationRequest {
    /// New invocation with a freshly generated request id.
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            method: method.to_string(),
            path: path.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Handle one invocation. Never panics and never fails.
pub fn handle(request: &InvocationRequest) -> HandlerResponse {
    let span = info_span!(
        "invocation",
        request_id = %request.request_id,
        method = %request.method,
        path = %request.path,
    );
    let _entered = span.enter();

    info!("Processing request: {} {}", request.method, request.path);
    if let Some(market_id) = request.header(MARKET_ID_HEADER) {
        debug!(market_id, "market id header ignored");
    }

    guard(|| respond(request))
}

fn respond(request: &InvocationRequest) -> Result<HandlerResponse, serde_json::Error> {
    let outcome = validate(&request.method, request.body.as_deref());
    match &outcome {
        ValidationOutcome::Valid { full_name } => {
            info!("Processing request for: {full_name}");
        }
        ValidationOutcome::BadRequest(BadRequestReason::MalformedJson { detail }) => {
            error!("JSON parsing error: {detail}");
        }
        _ => {}
    }
    build_response(&outcome)
}

/// Run `f`, converting an error or a panic into the 500 response.
pub(crate) fn guard<F, E>(f: F) -> HandlerResponse
where
    F: FnOnce() -> Result<HandlerResponse, E>,
    E: Display,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => internal_failure(e.to_string()),
        Err(payload) => internal_failure(panic_message(payload.as_ref())),
    }
}

fn internal_failure(message: String) -> HandlerResponse {
    error!("Unexpected error: {message}");
    let outcome = ValidationOutcome::InternalError { message };
    build_response(&outcome).unwrap_or_else(|_| internal_error_response())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
