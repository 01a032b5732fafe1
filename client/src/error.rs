//! Error types for the client and the contract verifier.
//!
//! # Design
//! Sending a request never produces a `ClientError`: transport failures are
//! folded into `ApiResponse` at the client boundary. `ClientError` covers
//! everything around the calls (payload serialization, fixture loading,
//! readiness). `ContractError` always names the interaction it belongs to.

use std::path::PathBuf;

use thiserror::Error;

use crate::contract::JsonKind;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported HTTP method {0:?}")]
    InvalidMethod(String),

    /// The readiness endpoint never answered with a 2xx.
    #[error("{url} did not become ready after {attempts} attempts")]
    NotReady { url: String, attempts: u32 },

    #[error("failed to read fixture {}: {source}", path.display())]
    FixtureIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fixture: {0}")]
    FixtureFormat(#[source] serde_json::Error),
}

/// Where a response body departs from the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeMismatch {
    #[error("property '{path}' missing in actual response")]
    MissingKey { path: String },

    #[error("'{path}' expected {expected}, got {actual}")]
    Kind {
        path: String,
        expected: JsonKind,
        actual: JsonKind,
    },
}

/// A failed interaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("{description}: cannot build request: {reason}")]
    Request { description: String, reason: String },

    #[error("{description}: expected status {expected}, got {actual}")]
    Status {
        description: String,
        expected: u16,
        actual: u16,
    },

    #[error("{description}: expected header '{header}' not found in response")]
    MissingHeader { description: String, header: String },

    #[error("{description}: response body is empty")]
    EmptyBody { description: String },

    #[error("{description}: response body is not JSON: {reason}")]
    InvalidBody { description: String, reason: String },

    #[error("{description}: {mismatch}")]
    Shape {
        description: String,
        mismatch: ShapeMismatch,
    },
}

impl ContractError {
    /// Description of the interaction that failed.
    pub fn description(&self) -> &str {
        match self {
            ContractError::Request { description, .. }
            | ContractError::Status { description, .. }
            | ContractError::MissingHeader { description, .. }
            | ContractError::EmptyBody { description }
            | ContractError::InvalidBody { description, .. }
            | ContractError::Shape { description, .. } => description,
        }
    }
}
