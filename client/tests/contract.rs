//! Replay recorded interactions against a fresh handler.
//!
//! Each test starts its own handler instance, so interactions are verified
//! against a server with no history.

mod common;

use std::collections::BTreeMap;

use name_client::contract::{
    HeaderValues, InteractionRequest, InteractionResponse, InteractionResult,
};
use name_client::{
    ApiClient, ClientConfig, ContractError, ContractVerifier, Interaction, Pact, ShapeMismatch,
};
use name_handler::{build_response, BadRequestReason, ValidationOutcome};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const FIXTURE: &str = include_str!("../../pacts/name-client-name-handler.json");

fn verifier() -> ContractVerifier {
    ContractVerifier::new(ApiClient::new(&ClientConfig::new(&common::spawn_handler())))
}

fn fixture() -> Pact {
    Pact::from_json(FIXTURE).unwrap()
}

#[test]
fn recorded_fixture_verifies() {
    let pact = fixture();
    assert_eq!(pact.interactions.len(), 4);

    let report = verifier().verify_all(&pact);
    let failures: Vec<String> = report.failures().map(ToString::to_string).collect();
    assert!(failures.is_empty(), "{failures:#?}");
    assert_eq!(report.into_result(), Ok(4));
}

#[test]
fn fixture_loads_from_disk() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../pacts/name-client-name-handler.json");
    assert_eq!(Pact::load(path).unwrap(), fixture());
}

/// Interactions derived from the handler's own response table must verify
/// against the handler.
#[test]
fn interactions_generated_from_the_response_table_verify() {
    let cases = [
        (
            "valid names",
            "POST",
            Some(json!({"FirstName": "John", "LastName": "Doe"})),
            ValidationOutcome::Valid {
                full_name: "John Doe".to_string(),
            },
        ),
        (
            "missing first name",
            "POST",
            Some(json!({"LastName": "Doe"})),
            ValidationOutcome::BadRequest(BadRequestReason::MissingFields),
        ),
        (
            "blank last name",
            "POST",
            Some(json!({"FirstName": "John", "LastName": "  "})),
            ValidationOutcome::BadRequest(BadRequestReason::MissingFields),
        ),
        (
            "not an object",
            "POST",
            Some(json!("John Doe")),
            ValidationOutcome::BadRequest(BadRequestReason::MalformedJson {
                detail: String::new(),
            }),
        ),
        (
            "no body",
            "POST",
            None,
            ValidationOutcome::BadRequest(BadRequestReason::EmptyBody),
        ),
        ("get", "GET", None, ValidationOutcome::MethodNotAllowed),
        (
            "delete with body",
            "DELETE",
            Some(json!({"FirstName": "John", "LastName": "Doe"})),
            ValidationOutcome::MethodNotAllowed,
        ),
        ("options", "OPTIONS", None, ValidationOutcome::MethodNotAllowed),
    ];

    let pact = Pact {
        consumer: None,
        provider: None,
        interactions: cases
            .into_iter()
            .map(|(description, method, body, outcome)| {
                let expected = build_response(&outcome).unwrap();
                let headers = expected
                    .headers
                    .into_iter()
                    .map(|(name, value)| (name, HeaderValues::One(value)))
                    .collect();
                Interaction {
                    description: description.to_string(),
                    request: InteractionRequest {
                        method: method.to_string(),
                        path: "/".to_string(),
                        headers: BTreeMap::new(),
                        body,
                    },
                    response: InteractionResponse {
                        status: expected.status,
                        headers,
                        body: Some(serde_json::from_str::<Value>(&expected.body).unwrap()),
                    },
                }
            })
            .collect(),
    };

    let report = verifier().verify_all(&pact);
    let failures: Vec<String> = report.failures().map(ToString::to_string).collect();
    assert!(failures.is_empty(), "{failures:#?}");
    assert_eq!(report.passed(), 8);
}

#[test]
fn recorded_body_is_sent_with_a_delete() {
    let (url, captured) = common::capture_one_request();
    let verifier = ContractVerifier::new(ApiClient::new(&ClientConfig::new(&url)));
    let interaction = Interaction {
        description: "A delete carrying both names".to_string(),
        request: InteractionRequest {
            method: "DELETE".to_string(),
            path: "/".to_string(),
            headers: BTreeMap::new(),
            body: Some(json!({"FirstName": "John", "LastName": "Doe"})),
        },
        response: InteractionResponse {
            status: 405,
            headers: BTreeMap::new(),
            body: None,
        },
    };

    assert_eq!(verifier.verify(&interaction), Ok(()));

    let raw = captured.recv().unwrap();
    assert!(raw.starts_with("DELETE / HTTP/1.1\r\n"), "{raw}");
    assert!(
        raw.to_ascii_lowercase()
            .contains("content-type: application/json; charset=utf-8"),
        "{raw}"
    );
    assert!(raw.ends_with(r#"{"FirstName":"John","LastName":"Doe"}"#), "{raw}");
}

#[test]
fn drifted_interaction_fails_without_affecting_others() {
    let mut pact = fixture();
    let drifted = &mut pact.interactions[0];
    drifted.description = "A valid request expecting a greeting".to_string();
    drifted.response.body = Some(json!({
        "content": {"message": "x", "fullName": "y", "greeting": "z"},
        "contentType": "application/json"
    }));

    let report = verifier().verify_all(&pact);

    assert_eq!(report.passed(), 3);
    let failed: Vec<&InteractionResult> =
        report.results.iter().filter(|r| r.outcome.is_err()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(
        failed[0].outcome,
        Err(ContractError::Shape {
            description: "A valid request expecting a greeting".to_string(),
            mismatch: ShapeMismatch::MissingKey {
                path: "$.greeting".to_string()
            },
        })
    );
}

#[test]
fn wrong_value_kind_is_reported() {
    let mut pact = fixture();
    pact.interactions[1].response.body = Some(json!({"content": {"error": 400}, "encoded": false}));

    let err = verifier().verify(&pact.interactions[1]).unwrap_err();
    assert_eq!(err.description(), "A request missing firstname");
    assert!(matches!(err, ContractError::Shape { mismatch: ShapeMismatch::Kind { .. }, .. }));
}

#[test]
fn wrong_status_is_reported() {
    let mut pact = fixture();
    pact.interactions[3].response.status = 404;

    let err = verifier().verify(&pact.interactions[3]).unwrap_err();
    assert_eq!(
        err,
        ContractError::Status {
            description: "A request with invalid method".to_string(),
            expected: 404,
            actual: 405,
        }
    );
}

#[test]
fn missing_header_is_reported() {
    let mut pact = fixture();
    pact.interactions[0].response.headers.insert(
        "X-Request-Id".to_string(),
        HeaderValues::Many(vec!["anything".to_string()]),
    );

    let err = verifier().verify(&pact.interactions[0]).unwrap_err();
    assert!(matches!(err, ContractError::MissingHeader { ref header, .. } if header == "X-Request-Id"));
}

#[test]
fn replay_order_does_not_matter() {
    let verifier = verifier();
    let mut pact = fixture();
    let forward = verifier.verify_all(&pact);
    pact.interactions.reverse();
    let backward = verifier.verify_all(&pact);

    assert!(forward.is_success());
    assert!(backward.is_success());
}

#[test]
fn concurrent_replay_verifies() {
    let verifier = &verifier();
    let pact = fixture();

    std::thread::scope(|scope| {
        let handles: Vec<_> = pact
            .interactions
            .iter()
            .map(|interaction| scope.spawn(move || verifier.verify(interaction)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(()));
        }
    });
}

#[test]
fn unreachable_provider_fails_every_interaction() {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let verifier = ContractVerifier::new(ApiClient::new(&ClientConfig::new(&format!("http://{addr}"))));

    let report = verifier.verify_all(&fixture());

    assert_eq!(report.passed(), 0);
    assert_eq!(report.failures().count(), 4);
}
