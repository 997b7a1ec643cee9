//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack (outermost first)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │   Request ID     │ ← Sets and propagates X-Request-Id
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │     Tracing      │ ← HTTP request/response logging
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │      CORS        │ ← Cross-origin headers
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │    Admission     │ ← 429 rate limit, 401 auth (bypassed for /health)
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │   Body Limit     │ ← 413 over MAX_REQUEST_BODY_SIZE
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │   Catch Panic    │ ← 500 envelope instead of a dropped connection
//! └────────┬─────────┘
//!          ▼
//!      Handler
//! ```
//!
//! Rejected requests, including panicked handlers, still carry
//! `X-Request-Id` and CORS headers.
//!
//! # Route Groups
//!
//! - `/health` - Health (auth bypassed)
//! - `/api/v1/translation` - Text and voice translation, language list
//! - `/api/v1/price-discovery` - Price recommendations
//! - `/api/v1/negotiation` - Negotiation sessions
//! - `/api/v1/cultural` - Cultural guidance

use std::any::Any as PanicPayload;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::AppError;
use crate::handlers;
use crate::middleware::{
    AdmissionChain, AdmissionLayer, BearerAuthCheck, RateLimitCheck, TrustedProxyConfig,
};
use crate::state::AppState;

/// Header carrying the request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the application router with all routes and middleware configured.
///
/// - **Rate Limiting**: Enabled if `rate_limit_requests > 0`
/// - **Authentication**: Always on, except for `auth_bypass_paths`
/// - **Auth-failure guard**: Enabled if `auth_failure_limit_per_minute > 0`
/// - **CORS**: Configured from `cors_allowed_origins`
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/translation/translate", post(handlers::translate))
        .route("/translation/translate/voice", post(handlers::translate_voice))
        .route("/translation/languages", get(handlers::supported_languages))
        .route("/price-discovery/recommend", post(handlers::recommend_price))
        .route("/negotiation/start", post(handlers::start_negotiation))
        .route("/cultural/guidance", post(handlers::cultural_guidance));

    let routes = Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api);

    with_middleware(routes, state)
}

/// Wrap `routes` in the middleware stack and attach state.
fn with_middleware(routes: Router<AppState>, state: AppState) -> Router {
    let config = &state.config;

    let cors = build_cors_layer(&config.cors_allowed_origins);
    let admission = build_admission_chain(&state);
    info!(checks = ?admission.check_names(), "Admission chain configured");

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    info!(
        max_size_mb = config.max_request_body_size / (1024 * 1024),
        "Request body size limit configured"
    );

    // Layers apply bottom to top: the last one added runs first
    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(DefaultBodyLimit::max(config.max_request_body_size))
        .layer(AdmissionLayer::new(admission))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .with_state(state)
}

/// Render a handler panic as the generic 500 envelope.
fn panic_response(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    error!(panic = detail, "Handler panicked");
    AppError::Internal(detail.to_string()).into_response()
}

/// Assemble the admission checks: rate limit first, then bearer auth.
fn build_admission_chain(state: &AppState) -> AdmissionChain {
    let config = &state.config;
    let mut chain = AdmissionChain::new(TrustedProxyConfig::new(&config.trusted_proxies));

    if config.rate_limiting_enabled() {
        info!(
            requests = config.rate_limit_requests,
            window_secs = config.rate_limit_window.as_secs(),
            trusted_proxies = config.trusted_proxies.len(),
            "Rate limiting enabled"
        );
        chain = chain.with_check(RateLimitCheck::new(state.rate_limiter.clone()));
    } else {
        info!("Rate limiting disabled (RATE_LIMIT_REQUESTS=0)");
    }

    if state.auth_failure_guard.is_none() {
        info!("Auth-failure guard disabled (AUTH_FAILURE_LIMIT_PER_MINUTE=0)");
    }

    chain.with_check(
        BearerAuthCheck::new(state.token_verifier.clone(), config.auth_bypass_paths.clone())
            .with_failure_guard(state.auth_failure_guard.clone()),
    )
}

/// Build CORS layer from configuration.
///
/// # Security Note
///
/// Using `*` (any origin) is convenient for development but should be
/// avoided in production. Specify explicit origins instead.
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allow_any = allowed_origins.iter().any(|o| o == "*");

    if allow_any {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
