//! Contract verification: replay recorded interactions against a live
//! endpoint and check the responses still have the agreed shape.
//!
//! # Design
//! A fixture is a JSON document with a top-level `interactions` array, as
//! written by a pact recorder. Only structure is checked:
//! - status codes must match exactly;
//! - expected headers must be present, their values are not compared;
//! - every key of an expected JSON object must exist in the actual object
//!   with the same JSON kind, recursively. Extra actual keys are fine.
//!
//! Interactions share no state, so a failure in one never affects another.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, info_span, warn};

use crate::client::ApiClient;
use crate::error::{ClientError, ContractError, ShapeMismatch};
use crate::http::{HttpMethod, HttpRequest};
use crate::types::ApiResponse;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer: Option<Pacticipant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Pacticipant>,
    pub interactions: Vec<Interaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacticipant {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub description: String,
    pub request: InteractionRequest,
    pub response: InteractionResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRequest {
    pub method: String,
    #[serde(default = "root_path")]
    pub path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, HeaderValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    pub status: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, HeaderValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Header values are recorded either as a single string or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValues {
    One(String),
    Many(Vec<String>),
}

impl HeaderValues {
    pub fn joined(&self) -> String {
        match self {
            HeaderValues::One(value) => value.clone(),
            HeaderValues::Many(values) => values.join(", "),
        }
    }
}

fn root_path() -> String {
    "/".to_string()
}

impl Pact {
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        serde_json::from_str(json).map_err(ClientError::FixtureFormat)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ClientError::FixtureIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// The JSON document a recorded body describes.
///
/// Recorders wrap bodies as `{"content": ..., "contentType": ...}`. An object
/// counts as that envelope only when it has `content` next to `contentType`
/// or `encoded`; anything else, including a bare `{"content": ...}`, is taken
/// as the body itself.
pub fn body_content(body: &Value) -> &Value {
    match body {
        Value::Object(map) if map.contains_key("contentType") || map.contains_key("encoded") => {
            map.get("content").unwrap_or(body)
        }
        other => other,
    }
}

/// Kind of a JSON value, the unit of shape comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Bool,
            Value::Number(_) => JsonKind::Number,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::Array,
            Value::Object(_) => JsonKind::Object,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonKind::Null => "null",
            JsonKind::Bool => "boolean",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// Check that `actual` has the shape of `expected`.
///
/// Objects: every expected key must exist with a matching shape. Arrays:
/// every actual element must match the first expected element (an empty
/// expected array accepts any array). Scalars: kinds must agree.
pub fn match_shape(expected: &Value, actual: &Value) -> Result<(), ShapeMismatch> {
    match_at("$", expected, actual)
}

fn match_at(path: &str, expected: &Value, actual: &Value) -> Result<(), ShapeMismatch> {
    let (expected_kind, actual_kind) = (JsonKind::of(expected), JsonKind::of(actual));
    if expected_kind != actual_kind {
        return Err(ShapeMismatch::Kind {
            path: path.to_string(),
            expected: expected_kind,
            actual: actual_kind,
        });
    }

    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => {
            for (key, expected_value) in expected {
                let child = format!("{path}.{key}");
                let actual_value = actual
                    .get(key)
                    .ok_or_else(|| ShapeMismatch::MissingKey { path: child.clone() })?;
                match_at(&child, expected_value, actual_value)?;
            }
        }
        (Value::Array(expected), Value::Array(actual)) => {
            if let Some(template) = expected.first() {
                for (i, actual_value) in actual.iter().enumerate() {
                    match_at(&format!("{path}[{i}]"), template, actual_value)?;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Compare an actual response with what `interaction` expects.
pub fn check_response(interaction: &Interaction, actual: &ApiResponse) -> Result<(), ContractError> {
    let description = || interaction.description.clone();
    let expected = &interaction.response;

    if actual.status_code != expected.status {
        return Err(ContractError::Status {
            description: description(),
            expected: expected.status,
            actual: actual.status_code,
        });
    }

    for header in expected.headers.keys() {
        if actual.header(header).is_none() {
            return Err(ContractError::MissingHeader {
                description: description(),
                header: header.clone(),
            });
        }
    }

    if let Some(expected_body) = &expected.body {
        if actual.body.trim().is_empty() {
            return Err(ContractError::EmptyBody {
                description: description(),
            });
        }
        let actual_body: Value =
            serde_json::from_str(&actual.body).map_err(|e| ContractError::InvalidBody {
                description: description(),
                reason: e.to_string(),
            })?;
        match_shape(body_content(expected_body), &actual_body).map_err(|mismatch| {
            ContractError::Shape {
                description: description(),
                mismatch,
            }
        })?;
    }

    Ok(())
}

/// Result of verifying one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionResult {
    pub description: String,
    pub outcome: Result<(), ContractError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    pub results: Vec<InteractionResult>,
}

impl VerificationReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ContractError> {
        self.results.iter().filter_map(|r| r.outcome.as_ref().err())
    }

    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_ok())
    }

    /// Number of verified interactions, or every failure.
    pub fn into_result(self) -> Result<usize, Vec<ContractError>> {
        let total = self.results.len();
        let failures: Vec<ContractError> = self
            .results
            .into_iter()
            .filter_map(|r| r.outcome.err())
            .collect();
        if failures.is_empty() {
            Ok(total)
        } else {
            Err(failures)
        }
    }
}

/// Replays interactions through an `ApiClient`.
#[derive(Debug, Clone)]
pub struct ContractVerifier {
    client: ApiClient,
}

impl ContractVerifier {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The request an interaction describes, resolved against the client's
    /// base URL.
    pub fn build_request(&self, interaction: &Interaction) -> Result<HttpRequest, ContractError> {
        let recorded = &interaction.request;
        let method: HttpMethod =
            recorded
                .method
                .parse()
                .map_err(|e: ClientError| ContractError::Request {
                    description: interaction.description.clone(),
                    reason: e.to_string(),
                })?;
        let body = recorded
            .body
            .as_ref()
            .map(|body| body_content(body).to_string());
        let headers: Vec<(String, String)> = recorded
            .headers
            .iter()
            .map(|(name, values)| (name.clone(), values.joined()))
            .collect();
        let overrides: Vec<(&str, &str)> = headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();

        Ok(self
            .client
            .build_request(method, &recorded.path, body, &overrides))
    }

    pub fn verify(&self, interaction: &Interaction) -> Result<(), ContractError> {
        let span = info_span!("interaction", description = %interaction.description);
        let _entered = span.enter();

        let request = self.build_request(interaction)?;
        let actual = self.client.execute(request);
        info!(status = actual.status_code, "replayed");
        check_response(interaction, &actual)
    }

    /// Verify every interaction. A failure is recorded and the remaining
    /// interactions are still verified.
    pub fn verify_all(&self, pact: &Pact) -> VerificationReport {
        let results = pact
            .interactions
            .iter()
            .map(|interaction| {
                let outcome = self.verify(interaction);
                match &outcome {
                    Ok(()) => info!(description = %interaction.description, "interaction verified"),
                    Err(e) => warn!(error = %e, "interaction failed"),
                }
                InteractionResult {
                    description: interaction.description.clone(),
                    outcome,
                }
            })
            .collect();
        VerificationReport { results }
    }
}
