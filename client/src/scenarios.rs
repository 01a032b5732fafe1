//! The canned scenarios the consumer binary runs against a deployed endpoint.

use std::fmt;

use crate::client::ApiClient;
use crate::types::ApiResponse;

/// One request and the status it should produce.
#[derive(Clone, Copy)]
pub struct Scenario {
    pub title: &'static str,
    pub expected_status: u16,
    send: fn(&ApiClient) -> ApiResponse,
}

#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub scenario: Scenario,
    pub response: ApiResponse,
}

impl ScenarioResult {
    pub fn passed(&self) -> bool {
        self.response.status_code == self.scenario.expected_status
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("title", &self.title)
            .field("expected_status", &self.expected_status)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    pub fn run(&self, client: &ApiClient) -> ScenarioResult {
        ScenarioResult {
            scenario: *self,
            response: (self.send)(client),
        }
    }
}

/// Missing last name, missing first name, then a valid request.
pub fn canned_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            title: "Bad Request (missing lastName)",
            expected_status: 400,
            send: |client| client.send_missing_last_name("John"),
        },
        Scenario {
            title: "Bad Request (missing firstName)",
            expected_status: 400,
            send: |client| client.send_missing_first_name("Doe"),
        },
        Scenario {
            title: "Successful Request",
            expected_status: 200,
            send: |client| client.send_valid("John", "Doe"),
        },
    ]
}
