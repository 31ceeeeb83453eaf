//! Async dispatch boundary
//!
//! Models the host proxy's "suspend now, resume exactly once later"
//! contract. The header hook returns `Suspended` immediately; a spawned
//! task runs the verification and resumes the proxy through a single-shot
//! callback handle.

use std::sync::Arc;

use bawwab_core::{GateConfig, Result};
use bawwab_directory::Authenticate;
use http::header::AUTHORIZATION;
use http::HeaderMap;
use tracing::{debug, warn};

use crate::verify::{Verdict, Verifier, REJECT_DETAIL};

/// Status returned to the proxy from a filter hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStatus {
    /// Processing continues synchronously
    Continue,
    /// Processing is suspended; the proxy will be resumed via callbacks
    Suspended,
}

/// One-shot continuation back into the proxy.
///
/// Both methods consume the box, so a dispatched verification can resume
/// the request at most once; the gate's spawned task guarantees at least
/// once by always reaching a verdict.
pub trait ProxyCallbacks: Send + 'static {
    /// Let the request continue through the filter chain.
    fn resume(self: Box<Self>);

    /// Reject the request with a local reply.
    fn send_reply(self: Box<Self>, status: u16, body: &str, detail: &str);
}

/// Single-shot wrapper around the proxy callbacks.
///
/// Consuming `resume`/`send_reply` keeps double-resumption unrepresentable;
/// the drop path covers the other direction: if a dispatched verification is
/// torn down before reaching a decision (a panic in the directory client,
/// a runtime shutdown), the request is still rejected rather than left
/// suspended forever.
struct Continuation {
    callbacks: Option<Box<dyn ProxyCallbacks>>,
}

impl Continuation {
    fn new(callbacks: Box<dyn ProxyCallbacks>) -> Self {
        Self {
            callbacks: Some(callbacks),
        }
    }

    fn resume(mut self) {
        if let Some(callbacks) = self.callbacks.take() {
            callbacks.resume();
        }
    }

    fn send_reply(mut self, status: u16, body: &str, detail: &str) {
        if let Some(callbacks) = self.callbacks.take() {
            callbacks.send_reply(status, body, detail);
        }
    }
}

impl Drop for Continuation {
    fn drop(&mut self) {
        if let Some(callbacks) = self.callbacks.take() {
            warn!("verification ended without a decision, rejecting the request");
            callbacks.send_reply(401, "invalid username or password", REJECT_DETAIL);
        }
    }
}

/// The inline authentication gate.
///
/// One instance is built per filter configuration and shared across all
/// requests the proxy hands it.
pub struct AuthGate {
    verifier: Arc<Verifier>,
}

impl AuthGate {
    /// Build a gate from validated configuration.
    pub fn new(config: GateConfig) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        Ok(Self {
            verifier: Arc::new(Verifier::new(config)),
        })
    }

    /// Gate with a caller-supplied authentication backend.
    pub fn with_authenticator(
        config: GateConfig,
        authenticator: Arc<dyn Authenticate>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            verifier: Arc::new(Verifier::with_authenticator(&config, authenticator)),
        })
    }

    /// Request-header hook.
    ///
    /// Returns `Suspended` immediately and resumes the proxy through
    /// `callbacks` exactly once from a spawned task, so a slow directory
    /// round-trip never blocks the proxy's request-processing thread.
    pub fn on_request_headers(
        &self,
        headers: &HeaderMap,
        _end_of_stream: bool,
        callbacks: Box<dyn ProxyCallbacks>,
    ) -> FilterStatus {
        // A present but non-UTF-8 value is a malformed header, not a
        // missing one; the empty string fails extraction downstream.
        let auth = headers
            .get(AUTHORIZATION)
            .map(|value| value.to_str().map(str::to_owned).unwrap_or_default());

        let verifier = self.verifier.clone();
        let continuation = Continuation::new(callbacks);
        tokio::spawn(async move {
            match verifier.verify(auth.as_deref()).await {
                Verdict::Allow => continuation.resume(),
                Verdict::Reject {
                    status,
                    reason,
                    detail,
                } => {
                    debug!(status, reason, "rejecting request");
                    continuation.send_reply(status, reason, detail);
                }
            }
        });

        FilterStatus::Suspended
    }
}
