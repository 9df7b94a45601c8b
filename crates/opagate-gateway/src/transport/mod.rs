//! Transport adapters (gRPC via tonic/tower).

pub mod grpc;

pub use grpc::{call_from_http, call_from_tonic, AuthzLayer, AuthzService};
