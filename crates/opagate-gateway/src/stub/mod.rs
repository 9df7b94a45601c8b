//! Stub policy-decision server.
//!
//! Implements the same HTTP contract as an OPA data endpoint, answering from a
//! static token -> method grant table. Used by the `opagate-stub` binary for
//! local development and by integration tests.

pub mod router;
pub mod rules;
pub mod state;

pub use router::{build_router, serve};
pub use state::StubState;
