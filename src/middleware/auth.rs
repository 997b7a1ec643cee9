//! Bearer token authentication.
//!
//! # Usage
//!
//! Clients send a JWT signed with `JWT_SECRET`:
//!
//! ```bash
//! curl -H "Authorization: Bearer $TOKEN" \
//!      http://localhost:8000/api/v1/translation/languages
//! ```
//!
//! On success the caller's [`AuthenticatedUser`] is inserted into request
//! extensions for handlers.
//!
//! # Bypassed Endpoints
//!
//! Paths in `AUTH_BYPASS_PATHS` (default `/health`) are served without a
//! token. Matching is exact and case-sensitive against the request path:
//! `/health/` and `/HEALTH` are not bypassed; query strings are ignored.
//!
//! # Brute Force Protection
//!
//! Failed verifications are counted per client with a GCRA limiter. Once a
//! client spends its failure burst it is blocked until the limiter
//! replenishes, and blocked clients get 429 before their token is examined.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::Request;
use axum::http::header::AUTHORIZATION;
use dashmap::DashMap;
use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use tracing::{debug, error, warn};

use super::AdmissionCheck;
use super::ip::client_identity;
use super::rate_limit::whole_seconds;
use crate::auth::{AuthenticatedUser, EXPIRED_TOKEN, TokenVerifier};
use crate::error::AppError;
use crate::metrics;

pub const MISSING_HEADER: &str = "Authorization header required";
pub const INVALID_HEADER: &str = "Invalid authorization header";

/// Per-client limiter for failed verifications.
type AuthFailureLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Blocks clients that keep failing authentication.
pub struct AuthFailureGuard {
    failures: AuthFailureLimiter,
    /// Clients that exhausted their failure budget, with block expiry
    blocked: DashMap<String, Instant>,
}

impl AuthFailureGuard {
    /// Returns `None` when `per_minute` is 0 (guard disabled).
    pub fn new(per_minute: u32, burst: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(per_minute)?;
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_minute(per_minute).allow_burst(burst);

        Some(Self {
            failures: RateLimiter::keyed(quota),
            blocked: DashMap::new(),
        })
    }

    /// Remaining block time for `client`, if it is blocked.
    pub fn blocked_for(&self, client: &str) -> Option<Duration> {
        let until = *self.blocked.get(client)?;
        let remaining = until.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            self.blocked.remove(client);
            None
        } else {
            Some(remaining)
        }
    }

    /// Count one failure. Returns the block duration if this failure
    /// exhausted the client's budget.
    pub fn record_failure(&self, client: &str) -> Option<Duration> {
        let key = client.to_string();
        match self.failures.check_key(&key) {
            Ok(()) => None,
            Err(not_until) => {
                let wait = not_until.wait_time_from(DefaultClock::default().now());
                self.blocked.insert(key, Instant::now() + wait);
                Some(wait)
            }
        }
    }

    /// Drop expired blocks and idle limiter state.
    pub fn sweep(&self) {
        let now = Instant::now();
        self.blocked.retain(|_, until| *until > now);
        self.failures.retain_recent();
    }

    pub fn blocked_clients(&self) -> usize {
        self.blocked.len()
    }
}

/// Verifies `Authorization: Bearer <token>` on every non-bypassed path.
#[derive(Clone)]
pub struct BearerAuthCheck {
    verifier: Arc<TokenVerifier>,
    bypass_paths: Arc<Vec<String>>,
    failure_guard: Option<Arc<AuthFailureGuard>>,
}

impl BearerAuthCheck {
    pub fn new(verifier: Arc<TokenVerifier>, bypass_paths: Vec<String>) -> Self {
        Self {
            verifier,
            bypass_paths: Arc::new(bypass_paths),
            failure_guard: None,
        }
    }

    pub fn with_failure_guard(mut self, guard: Option<Arc<AuthFailureGuard>>) -> Self {
        self.failure_guard = guard;
        self
    }

    pub fn is_bypassed(&self, path: &str) -> bool {
        self.bypass_paths.iter().any(|p| p == path)
    }
}

impl AdmissionCheck for BearerAuthCheck {
    fn name(&self) -> &'static str {
        "bearer_auth"
    }

    fn check(&self, req: &mut Request<Body>) -> Result<(), AppError> {
        let path = req.uri().path();
        if self.is_bypassed(path) {
            debug!(path, "Bypassing auth");
            return Ok(());
        }

        let client_ip = client_identity(req).to_string();

        if let Some(guard) = &self.failure_guard
            && let Some(remaining) = guard.blocked_for(&client_ip)
        {
            warn!(client_ip = %client_ip, "Request from client blocked after auth failures");
            metrics::record_admission_rejection(self.name(), "blocked");
            return Err(blocked(remaining));
        }

        let verified = extract_bearer(req).and_then(|token| self.verifier.verify(token));

        match verified {
            Ok(user) => {
                debug!(subject_id = %user.subject_id, "Bearer authentication successful");
                req.extensions_mut().insert::<AuthenticatedUser>(user);
                Ok(())
            }
            Err(err) => {
                let reason = failure_reason(&err);
                metrics::record_auth_failure(reason);
                metrics::record_admission_rejection(self.name(), reason);
                warn!(
                    path = %req.uri().path(),
                    client_ip = %client_ip,
                    reason,
                    "Authentication failed"
                );

                if reason != "missing_header"
                    && let Some(guard) = &self.failure_guard
                    && let Some(wait) = guard.record_failure(&client_ip)
                {
                    error!(
                        client_ip = %client_ip,
                        retry_after_secs = whole_seconds(wait),
                        "Client blocked due to excessive auth failures"
                    );
                }

                Err(err)
            }
        }
    }
}

fn blocked(wait: Duration) -> AppError {
    AppError::RateLimitExceeded {
        retry_after_secs: whole_seconds(wait),
        limit: 0,
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively and surrounding whitespace is
/// ignored.
fn extract_bearer<B>(req: &Request<B>) -> Result<&str, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized(MISSING_HEADER.to_string()))?;

    let value = header
        .to_str()
        .map_err(|_| AppError::Unauthorized(INVALID_HEADER.to_string()))?
        .trim();

    match value.split_once(char::is_whitespace) {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AppError::Unauthorized(INVALID_HEADER.to_string())),
    }
}

fn failure_reason(err: &AppError) -> &'static str {
    match err {
        AppError::Unauthorized(msg) if msg == MISSING_HEADER => "missing_header",
        AppError::Unauthorized(msg) if msg == INVALID_HEADER => "invalid_header",
        AppError::Unauthorized(msg) if msg == EXPIRED_TOKEN => "expired",
        _ => "invalid_token",
    }
}
