//! Client identity resolution for admission checks.
//!
//! The rate limiter and the auth-failure guard both key their state by client
//! address. The address is resolved once per request by the admission chain
//! and stored in request extensions as a [`ClientIdentity`].
//!
//! # Resolution Order
//!
//! 1. First entry of `X-Forwarded-For`
//! 2. `X-Real-IP`
//! 3. TCP peer address (requires serving with `into_make_service_with_connect_info`)
//! 4. [`UNKNOWN_IP`]
//!
//! Steps 1 and 2 apply only when the TCP peer is inside a `TRUSTED_PROXIES`
//! range. Any other peer, and any request without a known peer, is
//! identified without looking at forwarded headers. With `TRUSTED_PROXIES`
//! unset, every client is keyed by its TCP address.
//!
//! # Deploying Behind a Proxy
//!
//! List the proxy ranges in `TRUSTED_PROXIES` and make the proxy overwrite
//! (not append to) the header, otherwise clients can still pick the first
//! entry:
//!
//! ```nginx
//! proxy_set_header X-Real-IP $remote_addr;
//! proxy_set_header X-Forwarded-For $remote_addr;
//! ```
//!
//! ## The "unknown" Fallback
//!
//! Requests with no peer address share the `"unknown"` key and are therefore
//! limited collectively.

use std::borrow::Cow;
use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::Request;
use tracing::debug;

use super::rate_limit::TrustedProxyConfig;

/// Fallback identity when no client address can be determined.
pub const UNKNOWN_IP: &str = "unknown";

/// Resolved client identity, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(pub String);

impl ClientIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where a header-supplied address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractedIp<'a> {
    /// First address in `X-Forwarded-For`.
    FromXff(&'a str),
    /// `X-Real-IP`.
    FromRealIp(&'a str),
    NotFound,
}

/// Read the forwarded client address from headers without allocating.
///
/// Empty header values are skipped.
#[inline]
fn extract_ip_from_headers<B>(req: &Request<B>) -> ExtractedIp<'_> {
    // Format: "client, proxy1, proxy2"; the first entry is the client
    if let Some(forwarded) = req.headers().get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(first_ip) = value.split(',').next().map(str::trim)
        && !first_ip.is_empty()
    {
        return ExtractedIp::FromXff(first_ip);
    }

    if let Some(real_ip) = req.headers().get("x-real-ip")
        && let Ok(value) = real_ip.to_str()
        && !value.trim().is_empty()
    {
        return ExtractedIp::FromRealIp(value.trim());
    }

    ExtractedIp::NotFound
}

/// Resolve the client address for `req`.
///
/// Returns `Cow::Borrowed` for the [`UNKNOWN_IP`] fallback so the common
/// no-information case does not allocate.
pub fn extract_client_ip<B>(req: &Request<B>, trusted_proxies: &TrustedProxyConfig) -> Cow<'static, str> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let headers_trusted = peer.is_some_and(|ip| trusted_proxies.is_trusted(&ip));

    if headers_trusted {
        match extract_ip_from_headers(req) {
            ExtractedIp::FromXff(ip) | ExtractedIp::FromRealIp(ip) => {
                return Cow::Owned(ip.to_string());
            }
            ExtractedIp::NotFound => {
                if trusted_proxies.is_enabled() {
                    debug!("No proxy headers found - request may be bypassing reverse proxy");
                }
            }
        }
    } else if extract_ip_from_headers(req) != ExtractedIp::NotFound {
        debug!(
            peer = ?peer,
            "Ignoring forwarded headers from untrusted peer"
        );
    }

    match peer {
        Some(ip) => Cow::Owned(ip.to_string()),
        None => Cow::Borrowed(UNKNOWN_IP),
    }
}

/// Identity previously stored by the admission chain, or [`UNKNOWN_IP`].
pub fn client_identity<B>(req: &Request<B>) -> &str {
    req.extensions()
        .get::<ClientIdentity>()
        .map(ClientIdentity::as_str)
        .unwrap_or(UNKNOWN_IP)
}
