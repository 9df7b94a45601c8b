//! Policy layer (decision client).
//!
//! Wraps the network round trip to the external policy-decision service behind
//! the `DecisionClient` trait so the authorizer never depends on HTTP details.

pub mod client;

pub use client::{DecisionClient, HttpPolicyClient};
