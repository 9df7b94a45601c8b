//! Axum router wiring for the stub policy server.
//!
//! - `POST /v1/data/*path`: OPA data API shape, `{"input": ...}` -> `{"result": bool}`
//! - `GET /healthz`

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;

use opagate_core::protocol::PolicyQuery;

use super::state::StubState;

pub fn build_router(state: StubState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/data/*path", post(decide))
        .with_state(state)
}

/// Serve until the listener fails.
pub async fn serve(listener: TcpListener, state: StubState) -> std::io::Result<()> {
    axum::serve(listener, build_router(state)).await
}

async fn healthz() -> &'static str {
    "ok"
}

async fn decide(
    State(state): State<StubState>,
    Path(path): Path<String>,
    body: Result<Json<PolicyQuery>, JsonRejection>,
) -> Response {
    let query = match body {
        Ok(Json(q)) => q,
        Err(e) => {
            tracing::debug!(%path, error = %e, "stub rejected malformed query");
            return (StatusCode::BAD_REQUEST, e.body_text()).into_response();
        }
    };

    let verdict = state.decide(&query);
    tracing::debug!(%path, method = %query.method(), allowed = verdict.allowed, "stub decision");
    Json(verdict).into_response()
}
