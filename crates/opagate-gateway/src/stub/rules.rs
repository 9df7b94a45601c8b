//! Grant compilation and matching for the stub policy server.
//!
//! Method patterns: exact full method (`/pkg.Svc/Method`), a prefix ending in
//! `*` (`/pkg.Svc/*`), or `*` for every method.

use opagate_core::error::{AuthzError, Result};

use crate::config::Grant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodPattern {
    Any,
    Prefix(String),
    Exact(String),
}

impl MethodPattern {
    fn matches(&self, method: &str) -> bool {
        match self {
            MethodPattern::Any => true,
            MethodPattern::Prefix(p) => method.starts_with(p.as_str()),
            MethodPattern::Exact(m) => m == method,
        }
    }
}

/// Compiled grant: one token, the methods it may call.
#[derive(Debug, Clone)]
pub struct GrantRule {
    pub token: String,
    pub methods: Vec<MethodPattern>,
}

pub fn compile_pattern(raw: &str) -> Result<MethodPattern> {
    if raw == "*" {
        return Ok(MethodPattern::Any);
    }
    if !raw.starts_with('/') {
        return Err(AuthzError::BadConfig(format!(
            "invalid method pattern: {raw} (expected /pkg.Service/Method, /prefix*, or *)"
        )));
    }
    match raw.find('*') {
        None => Ok(MethodPattern::Exact(raw.to_string())),
        Some(i) if i == raw.len() - 1 => Ok(MethodPattern::Prefix(raw[..i].to_string())),
        Some(_) => Err(AuthzError::BadConfig(format!(
            "invalid method pattern: {raw} (wildcard only allowed at the end)"
        ))),
    }
}

pub fn compile_grants(raw: &[Grant]) -> Result<Vec<GrantRule>> {
    let mut out = Vec::with_capacity(raw.len());
    for g in raw {
        let methods = g
            .methods
            .iter()
            .map(|m| compile_pattern(m))
            .collect::<Result<Vec<_>>>()?;
        out.push(GrantRule { token: g.token.clone(), methods });
    }
    Ok(out)
}

pub fn is_granted(rules: &[GrantRule], token: &str, method: &str) -> bool {
    rules.iter().any(|r| {
        if r.token != token { return false; }
        r.methods.iter().any(|p| p.matches(method))
    })
}
