//! Decision query sent to the policy service.

use serde::{Deserialize, Serialize};

/// Structured policy input. Exactly two keys on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyInput {
    /// Full RPC method name (e.g. `/helloworld.Greeter/SayHello`).
    pub method: String,
    /// Credential taken from call metadata (may be empty).
    #[serde(rename = "authToken")]
    pub auth_token: String,
}

/// Query envelope (`{"input": {...}}`). Built fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyQuery {
    pub input: PolicyInput,
}

impl PolicyQuery {
    pub fn new(method: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            input: PolicyInput {
                method: method.into(),
                auth_token: auth_token.into(),
            },
        }
    }

    pub fn method(&self) -> &str {
        &self.input.method
    }

    pub fn auth_token(&self) -> &str {
        &self.input.auth_token
    }
}
