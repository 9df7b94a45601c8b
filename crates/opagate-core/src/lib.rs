//! opagate core: transport-agnostic authorization contracts.
//!
//! This crate defines the policy wire protocol (query + verdict), the read-only
//! view of an incoming call, and the error surface shared by the gateway and
//! its tests. It carries no transport or runtime dependencies so it can be
//! reused by any RPC framework adapter.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed policy responses and odd metadata surface as `PolicyError` /
//! `AuthzError`, never as a crash in the request path.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod call;
pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{AuthzError, DenyReason, PolicyError, Result};
