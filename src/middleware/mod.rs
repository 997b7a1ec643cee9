//! Request admission: the checks every request passes before routing.
//!
//! - **Client identity**: resolved once per request from proxy headers or the TCP peer
//! - **Rate limiting**: sliding-window threshold per client
//! - **Bearer authentication**: JWT verification with an auth-failure guard
//!
//! # Architecture
//!
//! ```text
//! Request → identify client → rate limit → bearer auth → Router → Handler
//!                                  ↓             ↓
//!                           429 Too Many    401 Unauthorized / 429 blocked
//! ```
//!
//! Checks run in the order they were added to the [`AdmissionChain`]; the
//! first rejection short-circuits the chain and is rendered as the standard
//! error envelope.

pub mod auth;
pub mod ip;
pub mod rate_limit;

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use tower::{Layer, Service};

use crate::error::AppError;

pub use auth::{AuthFailureGuard, BearerAuthCheck};
pub use ip::{ClientIdentity, UNKNOWN_IP, client_identity, extract_client_ip};
pub use rate_limit::{CidrRange, RateLimitCheck, TrustedProxyConfig};

/// One admission step.
///
/// Implementations may read the [`ClientIdentity`] extension and may insert
/// extensions of their own for later checks and handlers.
pub trait AdmissionCheck: Send + Sync {
    /// Label used in logs and metrics.
    fn name(&self) -> &'static str;

    fn check(&self, req: &mut Request<Body>) -> Result<(), AppError>;
}

/// Ordered list of admission checks.
#[derive(Clone, Default)]
pub struct AdmissionChain {
    trusted_proxies: Arc<TrustedProxyConfig>,
    checks: Vec<Arc<dyn AdmissionCheck>>,
}

impl AdmissionChain {
    pub fn new(trusted_proxies: TrustedProxyConfig) -> Self {
        Self {
            trusted_proxies: Arc::new(trusted_proxies),
            checks: Vec::new(),
        }
    }

    /// Append a check; it runs after those already added.
    pub fn with_check(mut self, check: impl AdmissionCheck + 'static) -> Self {
        self.checks.push(Arc::new(check));
        self
    }

    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Identify the client and run every check in order.
    pub fn admit(&self, req: &mut Request<Body>) -> Result<(), AppError> {
        let client = extract_client_ip(req, &self.trusted_proxies).into_owned();
        req.extensions_mut().insert(ClientIdentity(client));

        self.checks.iter().try_for_each(|check| check.check(req))
    }
}

/// Tower layer applying an [`AdmissionChain`] ahead of the router.
#[derive(Clone)]
pub struct AdmissionLayer {
    chain: Arc<AdmissionChain>,
}

impl AdmissionLayer {
    pub fn new(chain: AdmissionChain) -> Self {
        Self {
            chain: Arc::new(chain),
        }
    }
}

impl<S> Layer<S> for AdmissionLayer {
    type Service = AdmissionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AdmissionService {
            inner,
            chain: Arc::clone(&self.chain),
        }
    }
}

#[derive(Clone)]
pub struct AdmissionService<S> {
    inner: S,
    chain: Arc<AdmissionChain>,
}

impl<S> Service<Request<Body>> for AdmissionService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        if let Err(err) = self.chain.admit(&mut req) {
            return Box::pin(async move { Ok(err.into_response()) });
        }

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(req).await })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::limiter::SlidingWindowLimiter;
    use axum::extract::ConnectInfo;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Extension, Router};
    use std::net::SocketAddr;
    use std::time::Duration;
    use tower::ServiceExt;

    struct RecordOrder(&'static str);

    impl AdmissionCheck for RecordOrder {
        fn name(&self) -> &'static str {
            self.0
        }

        fn check(&self, req: &mut Request<Body>) -> Result<(), AppError> {
            let mut seen = req.extensions().get::<Vec<&'static str>>().cloned().unwrap_or_default();
            seen.push(self.0);
            req.extensions_mut().insert(seen);
            Ok(())
        }
    }

    struct Deny;

    impl AdmissionCheck for Deny {
        fn name(&self) -> &'static str {
            "deny"
        }

        fn check(&self, _req: &mut Request<Body>) -> Result<(), AppError> {
            Err(AppError::Unauthorized("denied".to_string()))
        }
    }

    #[test]
    fn test_checks_run_in_order_after_identification() {
        let chain = AdmissionChain::new(TrustedProxyConfig::new(&["10.0.0.0/8".to_string()]))
            .with_check(RecordOrder("first"))
            .with_check(RecordOrder("second"));
        assert_eq!(chain.check_names(), vec!["first", "second"]);

        let mut req = Request::builder()
            .header("x-forwarded-for", "203.0.113.5")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 2], 443))));
        chain.admit(&mut req).unwrap();

        assert_eq!(
            req.extensions().get::<Vec<&'static str>>().unwrap(),
            &vec!["first", "second"]
        );
        assert_eq!(client_identity(&req), "203.0.113.5");
    }

    #[test]
    fn test_first_rejection_short_circuits() {
        let chain = AdmissionChain::default()
            .with_check(Deny)
            .with_check(RecordOrder("never"));

        let mut req = Request::builder().body(Body::empty()).unwrap();
        assert!(chain.admit(&mut req).is_err());
        assert!(req.extensions().get::<Vec<&'static str>>().is_none());
    }

    #[tokio::test]
    async fn test_layer_renders_rejection() {
        let chain = AdmissionChain::default().with_check(Deny);
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(AdmissionLayer::new(chain));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_layer_passes_identity_to_handler() {
        let limiter = Arc::new(SlidingWindowLimiter::new(5, Duration::from_secs(60)));
        let chain = AdmissionChain::default().with_check(RateLimitCheck::new(limiter));
        let app = Router::new()
            .route(
                "/",
                get(|Extension(client): Extension<ClientIdentity>| async move { client.0 }),
            )
            .layer(AdmissionLayer::new(chain));

        let mut req = Request::builder()
            .uri("/")
            .header("x-real-ip", "192.0.2.44")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([198, 51, 100, 1], 50000))));

        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"198.51.100.1");
    }
}
