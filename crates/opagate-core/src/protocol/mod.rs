//! Policy-decision wire protocol (OPA data API).
//!
//! - Request: `{"input": {"method": "...", "authToken": "..."}}`
//! - Response: `{"result": <bool>}`
//!
//! Decoding is fallible and typed: an unexpected response shape becomes a
//! `PolicyError::Decode`, which the authorizer treats as "not allowed".

pub mod query;
pub mod verdict;

pub use query::{PolicyInput, PolicyQuery};
pub use verdict::{decode_verdict, PolicyVerdict};
