//! opagate: policy-decision gate for gRPC servers.
//!
//! Single dependency for hosts: `opagate::core` carries the wire protocol,
//! call view and errors; `opagate::gateway` carries the authorizer, the tower
//! layer and the stub policy server.
//!
//! ```ignore
//! use std::sync::Arc;
//! use opagate::gateway::{Authorizer, AuthzLayer, AuthzOption};
//!
//! let authz = Arc::new(Authorizer::new([AuthzOption::credential_header("x-token")]));
//! let layer = AuthzLayer::new(authz);
//! ```

pub mod core {
    pub use opagate_core::*;
}

pub mod gateway {
    pub use opagate_gateway::*;
}
