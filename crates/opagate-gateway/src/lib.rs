//! opagate gateway library entry.
//!
//! This crate wires configuration, the policy-decision client, the authorizer
//! and its interceptor adapters, and the tonic/tower layer into a gate that
//! sits in front of a gRPC server. It also ships a stub policy server for
//! local development and tests.

pub mod authz;
pub mod config;
pub mod obs;
pub mod policy;
pub mod stub;
pub mod transport;

pub use authz::{Authorizer, AuthzOption};
pub use transport::AuthzLayer;
