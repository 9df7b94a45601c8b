//! Per-call authorization: credential extraction -> policy query -> verdict.
//!
//! Built once at startup and shared via `Arc`; nothing here is mutated after
//! construction except metric counters, so concurrent calls never contend.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use opagate_core::call::{CallContext, CallMetadata};
use opagate_core::error::{AuthzError, DenyReason, PolicyError, Result};
use opagate_core::protocol::PolicyQuery;

use crate::obs::AuthzMetrics;
use crate::policy::DecisionClient;

use super::options::{AuthorizerBuilder, AuthorizerConfig, AuthzOption};

pub struct Authorizer {
    cfg: AuthorizerConfig,
    client: Arc<dyn DecisionClient>,
    metrics: Arc<AuthzMetrics>,
}

impl Authorizer {
    /// Defaults plus `options`, applied in order, over HTTP.
    pub fn new(options: impl IntoIterator<Item = AuthzOption>) -> Self {
        AuthorizerBuilder::new().options(options).build()
    }

    pub fn builder() -> AuthorizerBuilder {
        AuthorizerBuilder::new()
    }

    pub(crate) fn from_parts(
        cfg: AuthorizerConfig,
        client: Arc<dyn DecisionClient>,
        metrics: Arc<AuthzMetrics>,
    ) -> Self {
        Self { cfg, client, metrics }
    }

    pub fn config(&self) -> &AuthorizerConfig {
        &self.cfg
    }

    pub fn metrics(&self) -> &AuthzMetrics {
        &self.metrics
    }

    /// Decide one call.
    ///
    /// - no metadata at all => `EmptyMetadata`
    /// - missing credential, explicit deny, or unusable policy answer => `Unauthorized`
    pub async fn authorize(&self, call: &CallContext) -> Result<()> {
        let Some(md) = call.metadata.as_ref() else {
            self.metrics
                .decisions
                .inc(&[("outcome", "empty_metadata"), ("reason", "-")]);
            warn!(method = %call.full_method(), "call rejected: empty metadata");
            return Err(AuthzError::EmptyMetadata);
        };

        match self.decide(call, md).await {
            Ok(()) => {
                self.metrics
                    .decisions
                    .inc(&[("outcome", "allowed"), ("reason", "-")]);
                debug!(method = %call.full_method(), "call authorized");
                Ok(())
            }
            Err(reason) => {
                self.metrics
                    .decisions
                    .inc(&[("outcome", "denied"), ("reason", reason.as_str())]);
                warn!(method = %call.full_method(), %reason, "call denied");
                Err(AuthzError::Unauthorized)
            }
        }
    }

    async fn decide(&self, call: &CallContext, md: &CallMetadata) -> std::result::Result<(), DenyReason> {
        // No credential => no query, the policy service is not contacted.
        let token = md
            .first(&self.cfg.credential_header)
            .ok_or(DenyReason::MissingCredential)?;

        let query = PolicyQuery::new(call.full_method(), token);

        let started = Instant::now();
        let pending = self.client.decide(&self.cfg.policy_endpoint, &query);
        let res = match call.deadline {
            Some(budget) => tokio::time::timeout(budget, pending)
                .await
                .unwrap_or(Err(PolicyError::DeadlineExceeded)),
            None => pending.await,
        };
        self.metrics.policy_latency.observe(&[], started.elapsed());

        match res {
            Ok(verdict) if verdict.allowed => Ok(()),
            Ok(_) => Err(DenyReason::PolicyDenied),
            Err(e) => {
                self.metrics.policy_errors.inc(&[("kind", e.kind())]);
                warn!(endpoint = %self.cfg.policy_endpoint, error = %e, "policy decision unavailable, failing closed");
                Err(DenyReason::PolicyUnavailable(e))
            }
        }
    }
}
