//! Client and contract verifier for the name acknowledgment endpoint.
//!
//! # Overview
//! `ApiClient` sends name payloads (or deliberately broken ones) to a
//! configured endpoint and captures status, headers and body.
//! `ContractVerifier` replays recorded interactions through the same client
//! and checks that the responses keep their agreed shape.
//!
//! # Design
//! - Requests are built as plain data (`build_*`) and executed separately,
//!   so request construction is tested without a network.
//! - No call ever fails: transport errors are folded into `ApiResponse`.
//! - Payload and response types are defined independently from the handler
//!   crate; contract tests catch schema drift.

pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod http;
pub mod readiness;
pub mod scenarios;
pub mod types;

pub use client::ApiClient;
pub use config::{ClientConfig, ReadinessPolicy};
pub use contract::{ContractVerifier, Interaction, Pact, VerificationReport};
pub use error::{ClientError, ContractError, ShapeMismatch};
pub use http::{HttpMethod, HttpRequest};
pub use readiness::wait_until_ready;
pub use types::{Acknowledgment, ApiResponse, ErrorBody, NameRequest};
