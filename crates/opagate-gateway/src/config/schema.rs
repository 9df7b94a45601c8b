use serde::Deserialize;
use opagate_core::error::{AuthzError, Result};

pub const DEFAULT_POLICY_ENDPOINT: &str = "http://localhost:8181/v1/data/apis/invocation_allowed";
pub const DEFAULT_CREDENTIAL_HEADER: &str = "authorization";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub authz: AuthzSection,

    #[serde(default)]
    pub stub: StubSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(AuthzError::UnsupportedVersion);
        }

        self.authz.validate()?;
        self.stub.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthzSection {
    #[serde(default = "default_policy_endpoint")]
    pub policy_endpoint: String,

    #[serde(default = "default_credential_header")]
    pub credential_header: String,
}

impl Default for AuthzSection {
    fn default() -> Self {
        Self {
            policy_endpoint: default_policy_endpoint(),
            credential_header: default_credential_header(),
        }
    }
}

impl AuthzSection {
    pub fn validate(&self) -> Result<()> {
        let ep = self.policy_endpoint.trim();
        if !(ep.starts_with("http://") || ep.starts_with("https://")) {
            return Err(AuthzError::BadConfig(
                "authz.policy_endpoint must be an http(s) URL".into(),
            ));
        }
        if !is_header_token(&self.credential_header) {
            return Err(AuthzError::BadConfig(format!(
                "authz.credential_header is not a valid metadata key: {:?}",
                self.credential_header
            )));
        }
        if self.credential_header.to_ascii_lowercase().ends_with("-bin") {
            return Err(AuthzError::BadConfig(
                "authz.credential_header must not be a binary (-bin) key".into(),
            ));
        }
        Ok(())
    }
}

/// gRPC metadata keys: `0-9 a-z _ - .` (upper case accepted, lower-cased later).
fn is_header_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

fn default_policy_endpoint() -> String {
    DEFAULT_POLICY_ENDPOINT.into()
}
fn default_credential_header() -> String {
    DEFAULT_CREDENTIAL_HEADER.into()
}

/// Stub policy-decision server (dev/test only).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StubSection {
    #[serde(default = "default_stub_listen")]
    pub listen: String,

    #[serde(default)]
    pub grants: Vec<Grant>,
}

impl Default for StubSection {
    fn default() -> Self {
        Self {
            listen: default_stub_listen(),
            grants: Vec::new(),
        }
    }
}

impl StubSection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(AuthzError::BadConfig(format!(
                "stub.listen must be a valid socket address: {}",
                self.listen
            )));
        }
        for g in &self.grants {
            if g.token.is_empty() {
                return Err(AuthzError::BadConfig("stub.grants[].token must not be empty".into()));
            }
            if g.methods.is_empty() {
                return Err(AuthzError::BadConfig(format!(
                    "stub grant for token {:?} lists no methods",
                    g.token
                )));
            }
        }
        Ok(())
    }
}

fn default_stub_listen() -> String {
    "127.0.0.1:8181".into()
}

/// One token and the method patterns it may call.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Grant {
    pub token: String,
    pub methods: Vec<String>,
}
