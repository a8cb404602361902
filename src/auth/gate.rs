//! The authentication state machine.
//!
//! One gate instance serves every request. Each call runs independently on
//! caller-supplied per-request state; nothing decoded here outlives the
//! call, and no cross-request lock is held.
//!
//! Flow: anonymous short-circuit, dev bypass, downgrade guard, token
//! decode, freshness, identity load, digest verification, replay recording,
//! throttle count. The ordering is load-bearing: later steps consume state
//! produced by earlier ones.

use std::sync::Arc;

use super::alert::AlertSink;
use super::error::{AuthError, AuthErrorCode};
use super::freshness;
use super::history::HistoryStore;
use super::identity::{Identity, IdentityStore};
use super::models::{AuthOutcome, RequestContext, RouteClass};
use super::replay::{ReplayGuard, ReplayOutcome};
use super::throttle::{ThrottleGuard, ThrottlePolicy, Unlimited};
use super::{digest, token};
use crate::config::AuthConfig;

/// References shorter than this can only be dev literals, never real users.
const MIN_REF_LEN: usize = 4;

/// Orchestrates the signature checks into one accept/reject decision.
pub struct AuthenticationGate {
    config: AuthConfig,
    identities: Arc<dyn IdentityStore>,
    replay: ReplayGuard,
    throttle: ThrottleGuard,
    throttle_policy: Arc<dyn ThrottlePolicy>,
    alerts: Arc<dyn AlertSink>,
}

impl AuthenticationGate {
    pub fn new(
        config: AuthConfig,
        identities: Arc<dyn IdentityStore>,
        history: Arc<dyn HistoryStore>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            config,
            identities,
            replay: ReplayGuard::new(history.clone()),
            throttle: ThrottleGuard::new(history),
            throttle_policy: Arc::new(Unlimited),
            alerts,
        }
    }

    /// Replace the default (non-enforcing) throttle policy.
    pub fn with_throttle_policy(mut self, policy: Arc<dyn ThrottlePolicy>) -> Self {
        self.throttle_policy = policy;
        self
    }

    /// Authenticate one request.
    ///
    /// Returns `Anonymous` when no token was supplied, the loaded identity
    /// on success, and a typed error otherwise. Never terminates the
    /// process.
    pub async fn authenticate(
        &self,
        ctx: &RequestContext,
        route: RouteClass,
    ) -> Result<AuthOutcome, AuthError> {
        if ctx.raw_who.is_empty() {
            return Ok(AuthOutcome::Anonymous);
        }

        // A sub-4-char value can never be a valid encoded token: either it
        // is a dev literal, or it is rejected before any decode attempt.
        if ctx.raw_who.len() < MIN_REF_LEN {
            if self.config.dev_mode || route == RouteClass::Admin {
                let identity = self.load_dev_identity(&ctx.raw_who).await?;
                tracing::debug!(user_ref = %identity.user_ref, "dev bypass authenticated");
                return Ok(AuthOutcome::Identified(identity));
            }
            return Err(AuthError::new(
                AuthErrorCode::Validation,
                "User reference too short",
                Some("who"),
            ));
        }

        let token = token::decode(&ctx.raw_who)?;

        // Downgrade guard: dev-style refs are unusable outside dev mode
        if !self.config.dev_mode && token.user_ref.len() < MIN_REF_LEN {
            return Err(AuthError::new(
                AuthErrorCode::Validation,
                "User reference too short",
                Some("who"),
            ));
        }

        if !freshness::is_fresh(
            token.client_time_ms,
            ctx.server_time_ms,
            self.config.max_hours_old,
            self.config.max_hours_ahead,
        ) {
            tracing::error!(
                user_ref = %token.user_ref,
                server_time_ms = ctx.server_time_ms,
                client_time_ms = token.client_time_ms,
                "request timestamp outside freshness window"
            );
            self.alerts
                .stale_timestamp(&token.user_ref, ctx.server_time_ms, token.client_time_ms);
            return Err(AuthError::from_code(AuthErrorCode::Stale));
        }

        let identity = self
            .identities
            .lookup_by_ref(&token.user_ref)
            .await
            .map_err(AuthError::internal)?
            .ok_or_else(|| {
                AuthError::new(AuthErrorCode::NotFound, "Unknown user reference", Some("who"))
            })?;

        // Dev digest-skip: an empty digest passes in dev mode only
        let skip_digest = self.config.dev_mode && token.digest_hash.is_empty();
        if !skip_digest
            && !digest::verify(&token, &ctx.http_method, &ctx.url_path, &identity.secret)
        {
            return Err(AuthError::from_code(AuthErrorCode::Credentials));
        }

        // Admin routes bypass replay recording and throttle accounting
        if route != RouteClass::Admin {
            let outcome = self
                .replay
                .record_if_new(&ctx.raw_who, &token.user_ref, token.client_time_ms)
                .await
                .map_err(AuthError::internal)?;
            if outcome == ReplayOutcome::Replayed {
                return Err(AuthError::new(
                    AuthErrorCode::Replay,
                    "Request token already used",
                    Some("who"),
                ));
            }

            let recent = self
                .throttle
                .count_recent(
                    &token.user_ref,
                    self.config.throttle_interval_minutes,
                    ctx.server_time_ms,
                )
                .await
                .map_err(AuthError::internal)?;
            if !self.throttle_policy.allows(recent) {
                return Err(AuthError::from_code(AuthErrorCode::Throttled));
            }
        }

        Ok(AuthOutcome::Identified(identity))
    }

    /// Privileged replay-override: load an identity by explicit reference,
    /// skipping every signature check.
    ///
    /// Only the allow-listed admin route may call this; it is gated by the
    /// `admin_override_enabled` flag and never reachable from the normal
    /// middleware path.
    pub async fn authenticate_override(&self, user_ref: &str) -> Result<Identity, AuthError> {
        if !self.config.admin_override_enabled {
            return Err(AuthError::new(
                AuthErrorCode::Config,
                "Replay override is not enabled",
                None,
            ));
        }
        tracing::warn!(user_ref = %user_ref, "admin replay-override invoked");
        self.identities
            .lookup_by_ref(user_ref)
            .await
            .map_err(AuthError::internal)?
            .ok_or_else(|| {
                AuthError::new(AuthErrorCode::NotFound, "Unknown user reference", Some("user_ref"))
            })
    }

    /// Resolve a short literal against the configured dev references.
    ///
    /// Unmatched literals fall back to the first configured dev ref.
    async fn load_dev_identity(&self, raw_who: &str) -> Result<Identity, AuthError> {
        let dev_ref = self
            .config
            .dev_refs
            .iter()
            .find(|r| r.eq_ignore_ascii_case(raw_who))
            .or_else(|| self.config.dev_refs.first())
            .ok_or_else(|| {
                AuthError::new(
                    AuthErrorCode::Validation,
                    "No dev references configured",
                    Some("who"),
                )
            })?;
        self.identities
            .lookup_by_ref(dev_ref)
            .await
            .map_err(AuthError::internal)?
            .ok_or_else(|| {
                AuthError::new(AuthErrorCode::NotFound, "Unknown dev reference", Some("who"))
            })
    }
}
