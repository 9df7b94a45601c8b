//! Shared state for the stub policy server.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use opagate_core::error::Result;
use opagate_core::protocol::{PolicyQuery, PolicyVerdict};

use crate::config::StubSection;

use super::rules::{compile_grants, is_granted, GrantRule};

#[derive(Clone)]
pub struct StubState {
    inner: Arc<StubStateInner>,
}

struct StubStateInner {
    rules: Vec<GrantRule>,
    queries: AtomicU64,
}

impl StubState {
    /// Compile grants. Returns Result so main can report bad patterns without panicking.
    pub fn new(section: &StubSection) -> Result<Self> {
        let rules = compile_grants(&section.grants)?;
        if rules.is_empty() {
            tracing::warn!("stub has no grants, every query will be denied");
        }
        Ok(Self {
            inner: Arc::new(StubStateInner {
                rules,
                queries: AtomicU64::new(0),
            }),
        })
    }

    pub fn decide(&self, query: &PolicyQuery) -> PolicyVerdict {
        self.inner.queries.fetch_add(1, Ordering::Relaxed);
        if is_granted(&self.inner.rules, query.auth_token(), query.method()) {
            PolicyVerdict::allow()
        } else {
            PolicyVerdict::deny()
        }
    }

    /// Number of well-formed queries answered so far.
    pub fn queries_served(&self) -> u64 {
        self.inner.queries.load(Ordering::Relaxed)
    }

    pub fn grant_count(&self) -> usize {
        self.inner.rules.len()
    }
}
