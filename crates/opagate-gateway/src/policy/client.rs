//! Policy-decision client (HTTP round trip to an OPA-compatible endpoint).
//!
//! This is the only place that talks to the policy service. Status handling:
//! - transport error / non-2xx: short-circuit, the body is never read
//! - 2xx: body decoded into `PolicyVerdict` (typed decode error otherwise)
//!
//! No retries and no own timeout: the caller bounds the round trip with the
//! call's deadline.

use async_trait::async_trait;
use tracing::debug;

use opagate_core::error::PolicyError;
use opagate_core::protocol::{decode_verdict, PolicyQuery, PolicyVerdict};

/// Decision backend seam. The HTTP client is the production implementation;
/// tests plug in fakes.
#[async_trait]
pub trait DecisionClient: Send + Sync {
    async fn decide(
        &self,
        endpoint: &str,
        query: &PolicyQuery,
    ) -> Result<PolicyVerdict, PolicyError>;
}

/// reqwest-backed client. Cheap to clone (shares the connection pool).
#[derive(Debug, Clone, Default)]
pub struct HttpPolicyClient {
    http: reqwest::Client,
}

impl HttpPolicyClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse a host-provided `reqwest::Client` (proxy, TLS roots, pool size).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DecisionClient for HttpPolicyClient {
    async fn decide(
        &self,
        endpoint: &str,
        query: &PolicyQuery,
    ) -> Result<PolicyVerdict, PolicyError> {
        let response = self
            .http
            .post(endpoint)
            .json(query)
            .send()
            .await
            .map_err(|e| PolicyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PolicyError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PolicyError::Transport(format!("failed to read response body: {e}")))?;

        let verdict = decode_verdict(&body)?;
        debug!(method = %query.method(), allowed = verdict.allowed, "policy decision received");
        Ok(verdict)
    }
}
