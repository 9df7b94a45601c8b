//! Shared error types across opagate crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// The call carried no metadata at all.
    EmptyMetadata,
    /// Access denied, whatever the underlying cause.
    Unauthorized,
    /// Configuration rejected at startup.
    BadConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::EmptyMetadata => "EMPTY_METADATA",
            ClientCode::Unauthorized => "UNAUTHORIZED",
            ClientCode::BadConfig => "BAD_CONFIG",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Unified error type used by core and gateway.
///
/// `EmptyMetadata` and `Unauthorized` are the only variants a call can be
/// rejected with. Every denial cause (missing credential, policy says no,
/// policy service down) is folded into `Unauthorized` so callers learn
/// nothing about why they were turned away.
#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("empty metadata")]
    EmptyMetadata,
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl AuthzError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            AuthzError::EmptyMetadata => ClientCode::EmptyMetadata,
            AuthzError::Unauthorized => ClientCode::Unauthorized,
            AuthzError::BadConfig(_) => ClientCode::BadConfig,
            AuthzError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            AuthzError::Internal(_) => ClientCode::Internal,
        }
    }
}

/// Failure talking to the policy-decision service.
///
/// Never returned to RPC callers: the authorizer logs it and denies.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("policy request failed: {0}")]
    Transport(String),
    #[error("policy service answered HTTP {0}")]
    Status(u16),
    #[error("policy response malformed: {0}")]
    Decode(String),
    #[error("call deadline exceeded while waiting for policy decision")]
    DeadlineExceeded,
}

impl PolicyError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PolicyError::Transport(_) => "transport",
            PolicyError::Status(_) => "status",
            PolicyError::Decode(_) => "decode",
            PolicyError::DeadlineExceeded => "deadline",
        }
    }
}

/// Internal reason behind an `Unauthorized` outcome. Logged, never exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// Configured credential header not present on the call.
    MissingCredential,
    /// Policy service answered `result: false`.
    PolicyDenied,
    /// Policy service could not produce a decision.
    PolicyUnavailable(PolicyError),
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::MissingCredential => "missing_credential",
            DenyReason::PolicyDenied => "policy_denied",
            DenyReason::PolicyUnavailable(_) => "policy_unavailable",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenyReason::PolicyUnavailable(e) => write!(f, "policy_unavailable ({e})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// gRPC status for a rejected call. The message is fixed per variant so no
/// denial detail leaks to the caller.
#[cfg(feature = "grpc")]
pub fn to_grpc_status(err: &AuthzError) -> tonic::Status {
    match err {
        AuthzError::EmptyMetadata => tonic::Status::unauthenticated("empty metadata"),
        AuthzError::Unauthorized => tonic::Status::permission_denied("unauthorized"),
        other => tonic::Status::internal(other.client_code().as_str()),
    }
}

#[cfg(feature = "grpc")]
impl From<AuthzError> for tonic::Status {
    fn from(err: AuthzError) -> Self {
        to_grpc_status(&err)
    }
}
