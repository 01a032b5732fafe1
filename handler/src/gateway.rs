//! API-Gateway proxy integration.
//!
//! Lets the same entrypoint be driven by a gateway proxy event, which is how
//! the function runs when deployed behind a REST API. The event and response
//! types come from `aws_lambda_events`; only the members the handler reads
//! are converted.

use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::encodings::Body;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

use crate::handler::{handle, InvocationRequest};
use crate::response::HandlerResponse;

impl From<ApiGatewayProxyRequest> for InvocationRequest {
    fn from(event: ApiGatewayProxyRequest) -> Self {
        let mut request =
            InvocationRequest::new(event.http_method.as_str(), event.path.as_deref().unwrap_or("/"));
        if let Some(id) = event.request_context.request_id {
            request.request_id = id;
        }
        request.headers = event
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        request.body = event
            .body
            .map(|body| decode_body(body, event.is_base64_encoded));
        request
    }
}

/// Binary media types arrive base64 encoded. A body that fails to decode is
/// passed on unchanged and left to the validator.
fn decode_body(body: String, is_base64_encoded: bool) -> String {
    if !is_base64_encoded {
        return body;
    }
    match STANDARD.decode(body.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!("body flagged as base64 but not decodable: {e}");
            body
        }
    }
}

/// Convert a handler response into the gateway's response shape.
pub fn proxy_response(response: HandlerResponse) -> ApiGatewayProxyResponse {
    let mut headers = HeaderMap::new();
    for (name, value) in &response.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }

    let mut proxy = ApiGatewayProxyResponse::default();
    proxy.status_code = i64::from(response.status);
    proxy.headers = headers;
    proxy.body = Some(Body::Text(response.body));
    proxy
}

/// Handle a gateway proxy event.
pub fn handle_proxy_event(event: ApiGatewayProxyRequest) -> ApiGatewayProxyResponse {
    proxy_response(handle(&event.into()))
}
