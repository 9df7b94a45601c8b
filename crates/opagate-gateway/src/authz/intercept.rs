//! Interceptor adapters: the before-handler gates for unary and streaming calls.
//!
//! Per call: `Pending -> Authorized -> HandlerInvoked -> Completed`, or
//! `Pending -> Denied -> Rejected`. Authorization runs exactly once, at call
//! start; a rejected call never reaches the handler.

use std::future::Future;

use tracing::debug;

use opagate_core::call::CallContext;
use opagate_core::error::AuthzError;

use super::authorizer::Authorizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Pending,
    Authorized,
    HandlerInvoked,
    Completed,
    Denied,
    Rejected,
}

impl CallPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            CallPhase::Pending => "pending",
            CallPhase::Authorized => "authorized",
            CallPhase::HandlerInvoked => "handler_invoked",
            CallPhase::Completed => "completed",
            CallPhase::Denied => "denied",
            CallPhase::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CallPhase::Completed | CallPhase::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Unary,
    Streaming,
}

impl CallKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CallKind::Unary => "unary",
            CallKind::Streaming => "streaming",
        }
    }
}

impl Authorizer {
    /// Gate a single request/response handler. On success the handler runs
    /// once and its result is returned untouched.
    pub async fn unary<Req, Resp, E, H, Fut>(
        &self,
        call: &CallContext,
        request: Req,
        handler: H,
    ) -> Result<Resp, E>
    where
        H: FnOnce(Req) -> Fut,
        Fut: Future<Output = Result<Resp, E>>,
        E: From<AuthzError>,
    {
        self.gate(CallKind::Unary, call, move || handler(request)).await
    }

    /// Gate a stream handler. The stream is handed over only after the call is
    /// authorized; on denial it is dropped unread.
    pub async fn streaming<St, T, E, H, Fut>(
        &self,
        call: &CallContext,
        stream: St,
        handler: H,
    ) -> Result<T, E>
    where
        H: FnOnce(St) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<AuthzError>,
    {
        self.gate(CallKind::Streaming, call, move || handler(stream)).await
    }

    async fn gate<T, E, F, Fut>(&self, kind: CallKind, call: &CallContext, invoke: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<AuthzError>,
    {
        let method = call.full_method();
        trace_phase(kind, method, CallPhase::Pending);

        if let Err(e) = self.authorize(call).await {
            trace_phase(kind, method, CallPhase::Denied);
            self.finish(kind, method, CallPhase::Rejected);
            return Err(E::from(e));
        }
        trace_phase(kind, method, CallPhase::Authorized);

        trace_phase(kind, method, CallPhase::HandlerInvoked);
        let out = invoke().await;
        self.finish(kind, method, CallPhase::Completed);
        out
    }

    fn finish(&self, kind: CallKind, method: &str, phase: CallPhase) {
        debug_assert!(phase.is_terminal());
        trace_phase(kind, method, phase);
        self.metrics()
            .calls
            .inc(&[("kind", kind.as_str()), ("phase", phase.as_str())]);
    }
}

fn trace_phase(kind: CallKind, method: &str, phase: CallPhase) {
    debug!(kind = kind.as_str(), method, phase = phase.as_str(), "call phase");
}
