//! Blocking HTTP client for the name endpoint.
//!
//! # Design
//! Every operation is split into a pure `build_*` step that produces an
//! `HttpRequest` and a single `execute` step that performs the round-trip.
//! `execute` never fails: 4xx/5xx are returned as data and transport errors
//! (refused connection, timeout, DNS) become a 500 `ApiResponse`, mirroring
//! the handler's own catch-everything boundary.

use tracing::{debug, warn};
use ureq::typestate::{WithBody, WithoutBody};

use crate::config::{ClientConfig, JSON_CONTENT_TYPE, MARKET_ID_HEADER};
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{ApiResponse, NameRequest};

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
    default_headers: Vec<(String, String)>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        let mut default_headers = Vec::new();
        if let Some(market_id) = &config.market_id {
            default_headers.push((MARKET_ID_HEADER.to_string(), market_id.clone()));
        }
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            agent: config.agent(),
            default_headers,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying agent, shared with readiness polling.
    pub fn agent(&self) -> &ureq::Agent {
        &self.agent
    }

    /// Absolute URL for `path` relative to the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build a request against `path`. Requests with a body get a JSON
    /// content type; `header_overrides` replace defaults of the same name.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        header_overrides: &[(&str, &str)],
    ) -> HttpRequest {
        let mut headers = self.default_headers.clone();
        if body.is_some() {
            headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
        }
        for (name, value) in header_overrides {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.to_string(), value.to_string()));
        }
        HttpRequest {
            method,
            url: self.url_for(path),
            headers,
            body,
        }
    }

    pub fn build_json(
        &self,
        payload: &NameRequest,
        header_overrides: &[(&str, &str)],
    ) -> Result<HttpRequest, ClientError> {
        let body = serde_json::to_string(payload)?;
        Ok(self.build_request(HttpMethod::Post, "/", Some(body), header_overrides))
    }

    pub fn build_get(&self) -> HttpRequest {
        self.build_request(HttpMethod::Get, "/", None, &[])
    }

    pub fn send_valid(&self, first_name: &str, last_name: &str) -> ApiResponse {
        self.send(&NameRequest::new(first_name, last_name), &[])
    }

    pub fn send_missing_first_name(&self, last_name: &str) -> ApiResponse {
        self.send(&NameRequest::last_name_only(last_name), &[])
    }

    pub fn send_missing_last_name(&self, first_name: &str) -> ApiResponse {
        self.send(&NameRequest::first_name_only(first_name), &[])
    }

    pub fn send_get(&self) -> ApiResponse {
        self.execute(self.build_get())
    }

    /// POST `payload` as JSON.
    pub fn send(&self, payload: &NameRequest, header_overrides: &[(&str, &str)]) -> ApiResponse {
        match self.build_json(payload, header_overrides) {
            Ok(request) => self.execute(request),
            Err(e) => ApiResponse::transport_failure(e.to_string(), String::new()),
        }
    }

    /// POST `body` verbatim, for exercising malformed input.
    pub fn send_raw(&self, body: &str, header_overrides: &[(&str, &str)]) -> ApiResponse {
        let request =
            self.build_request(HttpMethod::Post, "/", Some(body.to_string()), header_overrides);
        self.execute(request)
    }

    /// Perform the round-trip. Never fails.
    pub fn execute(&self, request: HttpRequest) -> ApiResponse {
        let sent = request.body.clone().unwrap_or_default();
        debug!(method = %request.method, url = %request.url, "sending request");
        match self.round_trip(&request) {
            Ok((status, headers, body)) => {
                debug!(status, "received response");
                let mut response = ApiResponse::new(status, body, sent);
                response.headers = headers;
                response
            }
            Err(e) => {
                warn!(method = %request.method, url = %request.url, error = %e, "request failed");
                ApiResponse::transport_failure(e.to_string(), sent)
            }
        }
    }

    fn round_trip(
        &self,
        request: &HttpRequest,
    ) -> Result<(u16, Vec<(String, String)>, String), ureq::Error> {
        let url = request.url.as_str();
        let body = request.body.as_deref();
        let headers = request.headers.as_slice();

        let mut response = match request.method {
            HttpMethod::Get => send_optional(with_headers(self.agent.get(url), headers), body),
            HttpMethod::Delete => send_optional(with_headers(self.agent.delete(url), headers), body),
            HttpMethod::Head => send_optional(with_headers(self.agent.head(url), headers), body),
            HttpMethod::Options => {
                send_optional(with_headers(self.agent.options(url), headers), body)
            }
            HttpMethod::Post => send_body(with_headers(self.agent.post(url), headers), body),
            HttpMethod::Put => send_body(with_headers(self.agent.put(url), headers), body),
            HttpMethod::Patch => send_body(with_headers(self.agent.patch(url), headers), body),
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;
        Ok((status, headers, body))
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_body(
    builder: ureq::RequestBuilder<WithBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

/// Methods without a conventional body still carry one when it was given.
fn send_optional(
    builder: ureq::RequestBuilder<WithoutBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.force_send_body().send(body.as_bytes()),
        None => builder.call(),
    }
}
