//! tonic / tower integration.
//!
//! - `call_from_http` / `call_from_tonic`: build the `CallContext` view from
//!   HTTP/2 headers or tonic metadata (ASCII keys only, `-bin` keys skipped).
//! - `AuthzLayer`: a tower layer for `tonic::transport::Server::layer`. Every
//!   gRPC call is one HTTP/2 request whose path is the full method and whose
//!   body is the message stream, so the layer runs the streaming gate before
//!   the inner service ever polls the body.
//!
//! ```ignore
//! let authz = Arc::new(Authorizer::new([AuthzOption::credential_header("authorization")]));
//! Server::builder()
//!     .layer(AuthzLayer::new(authz))
//!     .add_service(GreeterServer::new(greeter))
//!     .serve(addr)
//!     .await?;
//! ```

use std::sync::Arc;
use std::task::{Context, Poll};

use tonic::body::BoxBody;
use tonic::codegen::BoxFuture;
use tonic::metadata::KeyAndValueRef;
use tower::{Layer, Service};

use opagate_core::call::{parse_grpc_timeout, CallContext, CallMetadata, GRPC_TIMEOUT_HEADER};
use opagate_core::error::{to_grpc_status, AuthzError};

use crate::authz::Authorizer;

/// Copy ASCII headers into call metadata.
pub fn metadata_from_headers(headers: &http::HeaderMap) -> CallMetadata {
    let mut md = CallMetadata::new();
    for (name, value) in headers.iter() {
        let key = name.as_str();
        if key.ends_with("-bin") {
            continue;
        }
        if let Ok(v) = value.to_str() {
            md.append(key, v);
        }
    }
    md
}

fn with_timeout(call: CallContext, md_timeout: Option<&str>) -> CallContext {
    match md_timeout.and_then(parse_grpc_timeout) {
        Some(budget) => call.with_deadline(budget),
        None => call,
    }
}

/// Call view for a raw gRPC HTTP/2 request. The URI path is the full method.
pub fn call_from_http<B>(req: &http::Request<B>) -> CallContext {
    let md = metadata_from_headers(req.headers());
    let timeout = md.first(GRPC_TIMEOUT_HEADER).map(str::to_owned);
    let call = CallContext::new(req.uri().path(), Some(md));
    with_timeout(call, timeout.as_deref())
}

/// Call view for a tonic request inside a service method. tonic does not
/// carry the method path into handlers, so the caller supplies it.
pub fn call_from_tonic<T>(req: &tonic::Request<T>, full_method: &str) -> CallContext {
    let mut md = CallMetadata::new();
    for kv in req.metadata().iter() {
        if let KeyAndValueRef::Ascii(key, value) = kv {
            if let Ok(v) = value.to_str() {
                md.append(key.as_str(), v);
            }
        }
    }
    let timeout = md.first(GRPC_TIMEOUT_HEADER).map(str::to_owned);
    let call = CallContext::new(full_method, Some(md));
    with_timeout(call, timeout.as_deref())
}

/// Trailers-only gRPC response carrying `status`.
pub fn status_response(status: &tonic::Status) -> http::Response<BoxBody> {
    let mut res = http::Response::new(tonic::body::empty_body());
    let headers = res.headers_mut();
    headers.insert("grpc-status", http::HeaderValue::from(status.code() as i32));
    if let Ok(msg) = http::HeaderValue::from_str(status.message()) {
        headers.insert("grpc-message", msg);
    }
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/grpc"),
    );
    res
}

#[derive(Clone)]
pub struct AuthzLayer {
    authorizer: Arc<Authorizer>,
}

impl AuthzLayer {
    pub fn new(authorizer: Arc<Authorizer>) -> Self {
        Self { authorizer }
    }

    pub fn authorizer(&self) -> &Arc<Authorizer> {
        &self.authorizer
    }
}

impl<S> Layer<S> for AuthzLayer {
    type Service = AuthzService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthzService {
            inner,
            authorizer: Arc::clone(&self.authorizer),
        }
    }
}

#[derive(Clone)]
pub struct AuthzService<S> {
    inner: S,
    authorizer: Arc<Authorizer>,
}

/// Keeps a denial apart from the inner service's own error.
enum Gate<E> {
    Denied(AuthzError),
    Inner(E),
}

impl<E> From<AuthzError> for Gate<E> {
    fn from(e: AuthzError) -> Self {
        Gate::Denied(e)
    }
}

impl<S, B> Service<http::Request<B>> for AuthzService<S>
where
    S: Service<http::Request<B>, Response = http::Response<BoxBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    B: Send + 'static,
{
    type Response = http::Response<BoxBody>;
    type Error = S::Error;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        // The instance driven to readiness serves this call; a fresh clone stays behind.
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);
        let authorizer = Arc::clone(&self.authorizer);

        Box::pin(async move {
            let call = call_from_http(&req);
            let gated = authorizer
                .streaming(&call, req, |req| async move {
                    let mut inner = inner;
                    inner.call(req).await.map_err(Gate::Inner)
                })
                .await;

            match gated {
                Ok(res) => Ok(res),
                Err(Gate::Denied(e)) => Ok(status_response(&to_grpc_status(&e))),
                Err(Gate::Inner(e)) => Err(e),
            }
        })
    }
}
