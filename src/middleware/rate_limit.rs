//! Per-client request rate limiting.
//!
//! # Algorithm
//!
//! Each client may make `RATE_LIMIT_REQUESTS` requests within any trailing
//! window of `RATE_LIMIT_WINDOW_SECS`. See [`SlidingWindowLimiter`] for the
//! bookkeeping. The limit applies to every path, including `/health`.
//!
//! # Response Headers
//!
//! On rate limit exceeded (429):
//! - `Retry-After`: Seconds until the oldest counted request leaves the window
//! - `X-RateLimit-Limit`: Configured requests per window
//! - `X-RateLimit-Remaining`: Always `0`
//!
//! # IP Spoofing Mitigation
//!
//! Clients are keyed by address, resolved as described in [`super::ip`].
//! Configure `TRUSTED_PROXIES` with the reverse proxy's CIDR ranges so that
//! `X-Forwarded-For` is only honored when it comes from the proxy.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use tracing::{debug, warn};

use super::AdmissionCheck;
use super::ip::client_identity;
use crate::error::AppError;
use crate::limiter::{Decision, SlidingWindowLimiter};
use crate::metrics;

// =============================================================================
// Trusted Proxy CIDR Matching
// =============================================================================

/// Parsed CIDR network range for trusted proxy validation.
#[derive(Debug, Clone)]
pub struct CidrRange {
    network: IpAddr,
    prefix_len: u8,
}

impl CidrRange {
    /// Parse a CIDR notation string (e.g., "10.0.0.0/8" or "::1/128").
    ///
    /// A bare address is treated as a single-host range. Returns `None` if the
    /// format is invalid.
    pub fn parse(cidr: &str) -> Option<Self> {
        let cidr = cidr.trim();

        let Some((addr, prefix)) = cidr.split_once('/') else {
            let ip: IpAddr = cidr.parse().ok()?;
            return Some(Self {
                network: ip,
                prefix_len: max_prefix(&ip),
            });
        };

        let ip: IpAddr = addr.parse().ok()?;
        let prefix_len: u8 = prefix.parse().ok()?;

        if prefix_len > max_prefix(&ip) {
            return None;
        }

        Some(Self {
            network: ip,
            prefix_len,
        })
    }

    /// Check if an IP address is contained within this CIDR range.
    pub fn contains(&self, ip: &IpAddr) -> bool {
        match (&self.network, ip) {
            (IpAddr::V4(net), IpAddr::V4(addr)) => {
                let mask = if self.prefix_len == 0 {
                    0
                } else {
                    u32::MAX << (32 - self.prefix_len)
                };
                (u32::from(*net) & mask) == (u32::from(*addr) & mask)
            }
            (IpAddr::V6(net), IpAddr::V6(addr)) => {
                let mask = if self.prefix_len == 0 {
                    0
                } else {
                    u128::MAX << (128 - self.prefix_len)
                };
                (u128::from(*net) & mask) == (u128::from(*addr) & mask)
            }
            _ => false,
        }
    }
}

fn max_prefix(ip: &IpAddr) -> u8 {
    match ip {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

/// Proxies whose forwarded-for headers are believed.
///
/// Empty means no peer is trusted.
#[derive(Debug, Clone, Default)]
pub struct TrustedProxyConfig {
    ranges: Vec<CidrRange>,
}

impl TrustedProxyConfig {
    /// Build from CIDR strings. Invalid entries are logged and skipped.
    pub fn new(cidrs: &[String]) -> Self {
        let ranges: Vec<CidrRange> = cidrs
            .iter()
            .filter_map(|cidr| {
                let parsed = CidrRange::parse(cidr);
                if parsed.is_none() {
                    warn!(cidr = %cidr, "Invalid CIDR range in TRUSTED_PROXIES, skipping");
                }
                parsed
            })
            .collect();

        if !ranges.is_empty() {
            debug!(count = ranges.len(), "Trusted proxy validation enabled");
        }

        Self { ranges }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ranges.is_empty()
    }

    /// True if `ip` is inside a configured range.
    pub fn is_trusted(&self, ip: &IpAddr) -> bool {
        self.ranges.iter().any(|range| range.contains(ip))
    }
}

// =============================================================================
// Admission Check
// =============================================================================

/// Rejects clients that exceed the per-window request threshold.
#[derive(Debug, Clone)]
pub struct RateLimitCheck {
    limiter: Arc<SlidingWindowLimiter>,
}

impl RateLimitCheck {
    pub fn new(limiter: Arc<SlidingWindowLimiter>) -> Self {
        Self { limiter }
    }
}

impl AdmissionCheck for RateLimitCheck {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    fn check(&self, req: &mut Request<Body>) -> Result<(), AppError> {
        let client_ip = client_identity(req);

        match self.limiter.admit(client_ip) {
            Decision::Allowed { .. } => Ok(()),
            Decision::Rejected { retry_after } => {
                let retry_after_secs = whole_seconds(retry_after);

                warn!(
                    client_ip = %client_ip,
                    path = %req.uri().path(),
                    retry_after_secs,
                    "Rate limit exceeded"
                );
                metrics::record_admission_rejection(self.name(), "exceeded");

                Err(AppError::RateLimitExceeded {
                    retry_after_secs,
                    limit: self.limiter.max_requests(),
                })
            }
        }
    }
}

/// Round up to whole seconds, never below one.
pub(crate) fn whole_seconds(duration: Duration) -> u64 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.max(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::middleware::ip::ClientIdentity;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn request_from(ip: &str) -> Request<Body> {
        let mut req = Request::builder()
            .uri("/api/v1/translation/languages")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut().insert(ClientIdentity(ip.to_string()));
        req
    }

    #[test]
    fn test_rate_limit_check_rejects_over_threshold() {
        let check = RateLimitCheck::new(Arc::new(SlidingWindowLimiter::new(
            2,
            Duration::from_secs(60),
        )));

        assert!(check.check(&mut request_from("1.2.3.4")).is_ok());
        assert!(check.check(&mut request_from("1.2.3.4")).is_ok());

        let err = check.check(&mut request_from("1.2.3.4")).unwrap_err();
        match &err {
            AppError::RateLimitExceeded {
                retry_after_secs,
                limit,
            } => {
                assert_eq!(*limit, 2);
                assert!((1..=60).contains(retry_after_secs));
            }
            other => panic!("expected RateLimitExceeded, got {other:?}"),
        }
        assert_eq!(err.into_response().status(), StatusCode::TOO_MANY_REQUESTS);

        // Another client is unaffected
        assert!(check.check(&mut request_from("5.6.7.8")).is_ok());
    }

    #[test]
    fn test_whole_seconds_rounds_up() {
        assert_eq!(whole_seconds(Duration::ZERO), 1);
        assert_eq!(whole_seconds(Duration::from_millis(10)), 1);
        assert_eq!(whole_seconds(Duration::from_secs(58)), 58);
        assert_eq!(whole_seconds(Duration::from_millis(58_001)), 59);
    }

    // ==========================================================================
    // CIDR Range Tests
    // ==========================================================================

    #[test]
    fn test_cidr_parse_ipv4() {
        let cidr = CidrRange::parse("10.0.0.0/8").unwrap();
        assert_eq!(cidr.prefix_len, 8);
    }

    #[test]
    fn test_cidr_parse_ipv6() {
        let cidr = CidrRange::parse("::1/128").unwrap();
        assert_eq!(cidr.prefix_len, 128);
    }

    #[test]
    fn test_cidr_parse_single_ip() {
        let cidr = CidrRange::parse("192.168.1.1").unwrap();
        assert_eq!(cidr.prefix_len, 32);
    }

    #[test]
    fn test_cidr_parse_invalid() {
        assert!(CidrRange::parse("not-an-ip").is_none());
        assert!(CidrRange::parse("10.0.0.0/33").is_none());
        assert!(CidrRange::parse("10.0.0.0/8/1").is_none());
    }

    #[test]
    fn test_cidr_contains_ipv4() {
        let cidr = CidrRange::parse("10.0.0.0/8").unwrap();

        assert!(cidr.contains(&"10.0.0.1".parse().unwrap()));
        assert!(cidr.contains(&"10.255.255.255".parse().unwrap()));
        assert!(!cidr.contains(&"11.0.0.1".parse().unwrap()));
        assert!(!cidr.contains(&"::1".parse().unwrap()));
    }

    #[test]
    fn test_trusted_proxy_config_empty_trusts_none() {
        let config = TrustedProxyConfig::new(&[]);
        assert!(!config.is_enabled());
        assert!(!config.is_trusted(&"1.2.3.4".parse().unwrap()));
        assert!(!config.is_trusted(&"127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_trusted_proxy_config_with_ranges() {
        let config = TrustedProxyConfig::new(&[
            "10.0.0.0/8".to_string(),
            "172.16.0.0/12".to_string(),
            "garbage".to_string(),
        ]);
        assert!(config.is_enabled());

        assert!(config.is_trusted(&"10.0.0.1".parse().unwrap()));
        assert!(config.is_trusted(&"172.31.255.255".parse().unwrap()));
        assert!(!config.is_trusted(&"192.168.1.1".parse().unwrap()));
    }
}
