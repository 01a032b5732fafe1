//! Name acknowledgment endpoint.
//!
//! # Overview
//! Accepts a POST carrying `FirstName` and `LastName`, validates that both
//! are present and answers with a JSON acknowledgment or a structured error.
//!
//! # Design
//! - `request::validate` is pure: `(method, body)` to `ValidationOutcome`.
//! - `response::build_response` is pure: outcome to status, headers, body.
//! - `handler::handle` composes the two, logs, and is the only place where
//!   failures are caught. It is stateless, so the router needs no state.
//! - `app()` routes every path and method to the handler, mirroring a
//!   gateway proxy integration; the method gate lives in the validator.

pub mod config;
pub mod gateway;
pub mod handler;
pub mod outcome;
pub mod request;
pub mod response;

use axum::{
    body::{Body, Bytes},
    extract::rejection::BytesRejection,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tracing::error;

pub use config::ServerConfig;
pub use gateway::handle_proxy_event;
pub use handler::{handle, InvocationRequest};
pub use outcome::{BadRequestReason, ValidationOutcome};
pub use request::{validate, NameRequest};
pub use response::{build_response, internal_error_response, HandlerResponse};

pub fn app() -> Router {
    Router::new().fallback(invoke)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn invoke(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            error!(status = rejection.status().as_u16(), "request body unreadable: {rejection}");
            return into_http(internal_error_response());
        }
    };

    let mut request = InvocationRequest::new(method.as_str(), uri.path());
    request.headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    if !body.is_empty() {
        request.body = Some(String::from_utf8_lossy(&body).into_owned());
    }

    into_http(handle(&request))
}

fn into_http(response: HandlerResponse) -> Response {
    let mut builder = Response::builder().status(response.status);
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
        .body(Body::from(response.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
