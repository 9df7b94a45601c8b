//! opagate stub policy server.
//!
//! Serves the OPA decision contract from the `stub` section of the config
//! file, so a gRPC server guarded by `AuthzLayer` can be exercised locally:
//! - `POST /v1/data/<any/path>` with `{"input": {"method", "authToken"}}`
//! - `GET /healthz`
//!
//! Usage: `opagate-stub [config.yaml]` (default `opagate.yaml`); log level via `RUST_LOG`.

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use opagate_gateway::{config, stub};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "opagate.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.stub.listen.parse()?;

    let state = stub::StubState::new(&cfg.stub)?;

    tracing::info!(%listen, grants = state.grant_count(), "opagate-stub starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    stub::serve(listener, state).await?;
    Ok(())
}
