//! Authorization layer (authorizer, options, interceptor adapters).
//!
//! One `Authorizer` per process, shared read-only by every call.

pub mod authorizer;
pub mod intercept;
pub mod options;

pub use authorizer::Authorizer;
pub use intercept::{CallKind, CallPhase};
pub use options::{AuthorizerBuilder, AuthorizerConfig, AuthzOption};
