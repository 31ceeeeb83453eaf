//! Verification orchestrator
//!
//! One forward pass per request:
//! extract -> cache check -> authenticate -> cache store -> decision.
//! No retries; the only resilience on the directory path is the connector's
//! connect timeout.

use std::sync::Arc;

use bawwab_core::{Error, GateConfig};
use bawwab_directory::{Authenticate, Authenticator};
use tracing::debug;

use crate::basic::parse_basic_auth;
use crate::cache::ResultCache;

/// Response-detail tag attached to every local reply
pub const REJECT_DETAIL: &str = "bad-request";

/// Terminal decision for one verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Reject {
        status: u16,
        reason: &'static str,
        detail: &'static str,
    },
}

impl Verdict {
    fn reject(err: &Error) -> Self {
        Verdict::Reject {
            status: err.http_status(),
            reason: err.public_reason(),
            detail: REJECT_DETAIL,
        }
    }
}

/// Runs the verification state machine.
///
/// One instance serves all requests: the strategy is fixed at construction
/// from the immutable configuration, and the cache synchronizes itself.
pub struct Verifier {
    cache: ResultCache,
    authenticator: Arc<dyn Authenticate>,
}

impl Verifier {
    pub fn new(config: Arc<GateConfig>) -> Self {
        let authenticator = Arc::new(Authenticator::from_config(config.clone()));
        Self::with_authenticator(&config, authenticator)
    }

    /// Seam for embedders that bring their own authentication backend.
    pub fn with_authenticator(config: &GateConfig, authenticator: Arc<dyn Authenticate>) -> Self {
        Self {
            cache: ResultCache::new(config.cache_ttl),
            authenticator,
        }
    }

    /// Verify one request's raw Authorization value.
    ///
    /// Always reaches a verdict: every internal failure is converted into a
    /// rejection rather than propagated, so the caller can resume the
    /// suspended request unconditionally.
    pub async fn verify(&self, auth_header: Option<&str>) -> Verdict {
        let Some(raw) = auth_header else {
            return Verdict::reject(&Error::MissingAuthorization);
        };

        let Some(credentials) = parse_basic_auth(raw) else {
            return Verdict::reject(&Error::MalformedAuthorization);
        };

        if self.cache.lookup(raw).await {
            debug!(username = %credentials.username, "cache hit, skipping directory");
            return Verdict::Allow;
        }

        match self
            .authenticator
            .authenticate(&credentials.username, &credentials.password)
            .await
        {
            Ok(()) => {
                self.cache.store(raw).await;
                debug!(username = %credentials.username, "authentication succeeded");
                Verdict::Allow
            }
            Err(err) => {
                debug!(username = %credentials.username, error = %err, "authentication failed");
                Verdict::reject(&err)
            }
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }
}
