//! Authorizer configuration and ordered options.
//!
//! Options are applied in the order given; each one sets exactly one field,
//! so a later option wins over an earlier one for the same field. Nothing is
//! validated here: a bad endpoint only shows up when the first call is
//! decided (and is then denied).

use std::sync::Arc;

use crate::config::schema::{AuthzSection, DEFAULT_CREDENTIAL_HEADER, DEFAULT_POLICY_ENDPOINT};
use crate::obs::AuthzMetrics;
use crate::policy::{DecisionClient, HttpPolicyClient};

use super::authorizer::Authorizer;

/// Immutable once built; owned by exactly one `Authorizer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizerConfig {
    /// Policy-decision endpoint (OPA data API URL).
    pub policy_endpoint: String,
    /// Metadata key holding the caller's credential (stored lower-cased).
    pub credential_header: String,
}

impl Default for AuthorizerConfig {
    fn default() -> Self {
        Self {
            policy_endpoint: DEFAULT_POLICY_ENDPOINT.to_string(),
            credential_header: DEFAULT_CREDENTIAL_HEADER.to_string(),
        }
    }
}

/// A single field-setting mutation of `AuthorizerConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthzOption {
    /// e.g. `http://localhost:8181/v1/data/apis/invocation_allowed`
    PolicyEndpoint(String),
    /// Metadata key to read the credential from (default `authorization`).
    CredentialHeader(String),
}

impl AuthzOption {
    pub fn policy_endpoint(url: impl Into<String>) -> Self {
        AuthzOption::PolicyEndpoint(url.into())
    }

    pub fn credential_header(name: impl Into<String>) -> Self {
        AuthzOption::CredentialHeader(name.into())
    }

    fn apply(self, cfg: &mut AuthorizerConfig) {
        match self {
            AuthzOption::PolicyEndpoint(url) => cfg.policy_endpoint = url,
            // gRPC metadata keys arrive lower-cased
            AuthzOption::CredentialHeader(name) => cfg.credential_header = name.to_ascii_lowercase(),
        }
    }
}

#[derive(Default)]
pub struct AuthorizerBuilder {
    cfg: AuthorizerConfig,
    client: Option<Arc<dyn DecisionClient>>,
    metrics: Option<Arc<AuthzMetrics>>,
}

impl AuthorizerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the `authz` config section. Options applied afterwards override it.
    pub fn from_section(section: &AuthzSection) -> Self {
        Self::new()
            .option(AuthzOption::policy_endpoint(section.policy_endpoint.clone()))
            .option(AuthzOption::credential_header(section.credential_header.clone()))
    }

    pub fn option(mut self, opt: AuthzOption) -> Self {
        opt.apply(&mut self.cfg);
        self
    }

    pub fn options(self, opts: impl IntoIterator<Item = AuthzOption>) -> Self {
        opts.into_iter().fold(self, |b, opt| b.option(opt))
    }

    /// Replace the decision backend (defaults to `HttpPolicyClient`).
    pub fn client(mut self, client: Arc<dyn DecisionClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Share a metrics registry with the host.
    pub fn metrics(mut self, metrics: Arc<AuthzMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &AuthorizerConfig {
        &self.cfg
    }

    pub fn build(self) -> Authorizer {
        let client = self
            .client
            .unwrap_or_else(|| Arc::new(HttpPolicyClient::new()));
        let metrics = self.metrics.unwrap_or_default();
        Authorizer::from_parts(self.cfg, client, metrics)
    }
}
