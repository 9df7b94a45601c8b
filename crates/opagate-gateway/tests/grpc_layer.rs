//! `AuthzLayer` in front of a plain tower service standing in for a tonic server.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]


use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tonic::body::BoxBody;
use tower::util::BoxCloneService;
use tower::{service_fn, Layer, ServiceExt};

use fake_policy::{authorizer_with, FakePolicy};
use opagate_gateway::authz::AuthzOption;
use opagate_gateway::AuthzLayer;

const SAY_HELLO: &str = "/helloworld.Greeter/SayHello";

fn grpc_request(headers: &[(&str, &str)]) -> http::Request<()> {
    let mut b = http::Request::builder()
        .method("POST")
        .uri(format!("http://localhost:50051{SAY_HELLO}"))
        .header("content-type", "application/grpc")
        .header("te", "trailers");
    for (k, v) in headers {
        b = b.header(*k, *v);
    }
    b.body(()).unwrap()
}

type Greeter = BoxCloneService<http::Request<()>, http::Response<BoxBody>, Infallible>;

/// Inner "server": counts calls and tags its responses.
fn greeter(hits: Arc<AtomicUsize>) -> Greeter {
    BoxCloneService::new(service_fn(move |_req: http::Request<()>| {
        let hits = Arc::clone(&hits);
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            let mut res = http::Response::new(tonic::body::empty_body());
            res.headers_mut()
                .insert("x-handled-by", http::HeaderValue::from_static("greeter"));
            Ok::<_, Infallible>(res)
        }
    }))
}

#[tokio::test]
async fn allowed_request_reaches_inner_service() {
    let fake = FakePolicy::allow_tokens(&["456"]);
    let hits = Arc::new(AtomicUsize::new(0));
    let svc = AuthzLayer::new(authorizer_with(&fake, vec![])).layer(greeter(hits.clone()));

    let res = svc
        .oneshot(grpc_request(&[("authorization", "456")]))
        .await
        .unwrap();

    assert_eq!(res.headers()["x-handled-by"], "greeter");
    assert!(res.headers().get("grpc-status").is_none());
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let (_, query) = &fake.seen()[0];
    assert_eq!(query.method(), SAY_HELLO);
    assert_eq!(query.auth_token(), "456");
}

#[tokio::test]
async fn denied_request_gets_permission_denied() {
    let fake = FakePolicy::allow_tokens(&["456"]);
    let hits = Arc::new(AtomicUsize::new(0));
    let svc = AuthzLayer::new(authorizer_with(&fake, vec![])).layer(greeter(hits.clone()));

    let res = svc
        .oneshot(grpc_request(&[("authorization", "000")]))
        .await
        .unwrap();

    assert_eq!(res.status(), http::StatusCode::OK);
    assert_eq!(res.headers()["grpc-status"], "7");
    assert_eq!(res.headers()["grpc-message"], "unauthorized");
    assert!(res.headers().get("x-handled-by").is_none());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn request_without_credential_is_denied_without_query() {
    let fake = FakePolicy::allow_tokens(&["456"]);
    let hits = Arc::new(AtomicUsize::new(0));
    let svc = AuthzLayer::new(authorizer_with(&fake, vec![])).layer(greeter(hits.clone()));

    let res = svc.oneshot(grpc_request(&[])).await.unwrap();

    assert_eq!(res.headers()["grpc-status"], "7");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(fake.calls(), 0);
}

#[tokio::test]
async fn header_lookup_is_case_insensitive() {
    let fake = FakePolicy::allow_tokens(&["456"]);
    let hits = Arc::new(AtomicUsize::new(0));
    let authz = authorizer_with(&fake, vec![AuthzOption::credential_header("X-Token")]);
    let svc = AuthzLayer::new(authz).layer(greeter(hits.clone()));

    let res = svc
        .oneshot(grpc_request(&[("X-TOKEN", "456")]))
        .await
        .unwrap();
    assert_eq!(res.headers()["x-handled-by"], "greeter");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn grpc_timeout_header_bounds_the_decision() {
    let fake = FakePolicy::slow(Duration::from_secs(10));
    let hits = Arc::new(AtomicUsize::new(0));
    let svc = AuthzLayer::new(authorizer_with(&fake, vec![])).layer(greeter(hits.clone()));

    let res = svc
        .oneshot(grpc_request(&[("authorization", "456"), ("grpc-timeout", "50m")]))
        .await
        .unwrap();

    assert_eq!(res.headers()["grpc-status"], "7");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn layer_shares_one_authorizer_across_services() {
    let fake = FakePolicy::allow_tokens(&["456"]);
    let layer = AuthzLayer::new(authorizer_with(&fake, vec![]));
    let hits = Arc::new(AtomicUsize::new(0));

    for token in ["456", "000", "456"] {
        let svc = layer.layer(greeter(hits.clone()));
        let _ = svc
            .oneshot(grpc_request(&[("authorization", token)]))
            .await
            .unwrap();
    }

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    let calls = &layer.authorizer().metrics().calls;
    assert_eq!(calls.get(&[("kind", "streaming"), ("phase", "completed")]), 2);
    assert_eq!(calls.get(&[("kind", "streaming"), ("phase", "rejected")]), 1);
}
