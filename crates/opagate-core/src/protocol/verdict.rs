//! Verdict returned by the policy service.

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// `{"result": <bool>}`. Unknown fields (e.g. OPA's `decision_id`) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyVerdict {
    #[serde(rename = "result")]
    pub allowed: bool,
}

impl PolicyVerdict {
    pub fn allow() -> Self {
        Self { allowed: true }
    }

    /// Fail-closed default.
    pub fn deny() -> Self {
        Self { allowed: false }
    }
}

/// Decode a response body. A missing or non-boolean `result` (OPA answers `{}`
/// for an undefined rule) is a decode error, not a panic.
pub fn decode_verdict(body: &[u8]) -> Result<PolicyVerdict, PolicyError> {
    serde_json::from_slice(body).map_err(|e| PolicyError::Decode(e.to_string()))
}
