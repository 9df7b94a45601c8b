//! HTTP decision client against a mocked OPA data API.
//!
//! Covers the wire shape of the query, status short-circuiting, verdict
//! decoding, and the authorizer failing closed on every unusable answer.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use opagate_core::call::{CallContext, CallMetadata};
use opagate_core::error::{AuthzError, PolicyError};
use opagate_core::protocol::PolicyQuery;
use opagate_gateway::authz::{Authorizer, AuthzOption};
use opagate_gateway::policy::{DecisionClient, HttpPolicyClient};

const DECISION_PATH: &str = "/v1/data/apis/invocation_allowed";
const SAY_HELLO: &str = "/helloworld.Greeter/SayHello";

fn endpoint(server: &MockServer) -> String {
    format!("{}{}", server.uri(), DECISION_PATH)
}

fn query(token: &str) -> PolicyQuery {
    PolicyQuery::new(SAY_HELLO, token)
}

async fn respond(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(DECISION_PATH))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn posts_exact_query_document() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DECISION_PATH))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "input": { "method": SAY_HELLO, "authToken": "456" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
        .expect(1)
        .mount(&server)
        .await;

    let verdict = HttpPolicyClient::new()
        .decide(&endpoint(&server), &query("456"))
        .await
        .expect("decision");
    assert!(verdict.allowed);
}

#[tokio::test]
async fn explicit_false_is_a_verdict_not_an_error() {
    let server = MockServer::start().await;
    respond(&server, ResponseTemplate::new(200).set_body_json(json!({ "result": false }))).await;

    let verdict = HttpPolicyClient::new()
        .decide(&endpoint(&server), &query("000"))
        .await
        .expect("decision");
    assert!(!verdict.allowed);
}

#[tokio::test]
async fn extra_response_fields_are_ignored() {
    let server = MockServer::start().await;
    respond(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "decision_id": "d-42", "result": true })),
    )
    .await;

    let verdict = HttpPolicyClient::new()
        .decide(&endpoint(&server), &query("456"))
        .await
        .expect("decision");
    assert!(verdict.allowed);
}

#[tokio::test]
async fn non_success_status_short_circuits() {
    for code in [400u16, 404, 500, 503] {
        let server = MockServer::start().await;
        // A body that would decode as allow must not be looked at.
        respond(&server, ResponseTemplate::new(code).set_body_json(json!({ "result": true }))).await;

        let err = HttpPolicyClient::new()
            .decide(&endpoint(&server), &query("456"))
            .await
            .expect_err("must fail");
        assert_eq!(err, PolicyError::Status(code));
    }
}

#[tokio::test]
async fn undecodable_bodies_are_decode_errors() {
    let bodies = [
        ResponseTemplate::new(200).set_body_json(json!({})),
        ResponseTemplate::new(200).set_body_json(json!({ "result": "yes" })),
        ResponseTemplate::new(200).set_body_string("<html>opa</html>"),
        ResponseTemplate::new(200),
    ];
    for template in bodies {
        let server = MockServer::start().await;
        respond(&server, template).await;

        let err = HttpPolicyClient::new()
            .decide(&endpoint(&server), &query("456"))
            .await
            .expect_err("must fail");
        assert_eq!(err.kind(), "decode", "got {err}");
    }
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = HttpPolicyClient::new()
        .decide(&format!("http://{addr}{DECISION_PATH}"), &query("456"))
        .await
        .expect_err("must fail");
    assert_eq!(err.kind(), "transport");
}

fn authorizer_for(server: &MockServer) -> Authorizer {
    Authorizer::new([AuthzOption::policy_endpoint(endpoint(server))])
}

fn bearer_call(token: &str) -> CallContext {
    CallContext::new(SAY_HELLO, Some(CallMetadata::new().with("authorization", token)))
}

#[tokio::test]
async fn authorizer_allows_on_true() {
    let server = MockServer::start().await;
    respond(&server, ResponseTemplate::new(200).set_body_json(json!({ "result": true }))).await;

    authorizer_for(&server)
        .authorize(&bearer_call("456"))
        .await
        .expect("allowed");
}

#[tokio::test]
async fn authorizer_fails_closed_on_server_error() {
    let server = MockServer::start().await;
    respond(&server, ResponseTemplate::new(500)).await;

    let authz = authorizer_for(&server);
    let err = authz.authorize(&bearer_call("456")).await.unwrap_err();
    assert!(matches!(err, AuthzError::Unauthorized));
    assert_eq!(authz.metrics().policy_errors.get(&[("kind", "status")]), 1);
}

#[tokio::test]
async fn authorizer_fails_closed_on_undefined_rule() {
    // OPA answers `{}` when the rule path does not exist.
    let server = MockServer::start().await;
    respond(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let authz = authorizer_for(&server);
    let err = authz.authorize(&bearer_call("456")).await.unwrap_err();
    assert!(matches!(err, AuthzError::Unauthorized));
    assert_eq!(authz.metrics().policy_errors.get(&[("kind", "decode")]), 1);
}

#[tokio::test]
async fn authorizer_never_queries_without_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
        .expect(0)
        .mount(&server)
        .await;

    let call = CallContext::new(SAY_HELLO, Some(CallMetadata::new().with("x-other", "456")));
    let err = authorizer_for(&server).authorize(&call).await.unwrap_err();
    assert!(matches!(err, AuthzError::Unauthorized));
}

#[tokio::test]
async fn slow_policy_service_is_cut_off_by_call_deadline() {
    let server = MockServer::start().await;
    respond(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "result": true }))
            .set_delay(Duration::from_secs(5)),
    )
    .await;

    let authz = authorizer_for(&server);
    let call = bearer_call("456").with_deadline(Duration::from_millis(100));
    let err = authz.authorize(&call).await.unwrap_err();
    assert!(matches!(err, AuthzError::Unauthorized));
    assert_eq!(authz.metrics().policy_errors.get(&[("kind", "deadline")]), 1);
}
