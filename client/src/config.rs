//! Client configuration.
//!
//! `ClientConfig` carries what every call needs (endpoint, timeout, optional
//! market id). `ReadinessPolicy` and the LocalStack URL helpers are used by
//! the consumer binary to locate and wait for a deployed endpoint.

use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_LOCALSTACK_URL: &str = "http://localhost:4566";
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const MARKET_ID_HEADER: &str = "X-Market-Id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Bound on a whole call, connect to last body byte. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Sent as `X-Market-Id` on every request when set.
    pub market_id: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            market_id: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_market_id(mut self, market_id: impl Into<String>) -> Self {
        self.market_id = Some(market_id.into());
        self
    }

    /// Agent that reports 4xx/5xx as data instead of errors, so the caller
    /// sees every status the endpoint produces.
    pub(crate) fn agent(&self) -> ureq::Agent {
        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(self.timeout)
            .build()
            .new_agent()
    }
}

/// How long to wait for a readiness endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(2),
        }
    }
}

/// Invoke URL of a REST API deployed to LocalStack's `prod` stage.
pub fn gateway_endpoint(localstack_url: &str, api_id: &str) -> String {
    format!(
        "{}/restapis/{api_id}/prod/_user_request_/",
        localstack_url.trim_end_matches('/')
    )
}

pub fn localstack_health_url(localstack_url: &str) -> String {
    format!("{}/_localstack/health", localstack_url.trim_end_matches('/'))
}
