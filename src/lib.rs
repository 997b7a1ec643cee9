//! # Vendor AI Services
//!
//! HTTP backend for local vendors: translation, price discovery, negotiation
//! sessions and cultural guidance behind an admission layer.
//!
//! - **Admission**: sliding-window rate limiting, JWT bearer authentication
//!   and a brute-force guard on failed verifications
//! - **Caching**: TTL + LRU translation cache with single-flight misses
//! - **Observability**: Request IDs, structured logging, Prometheus metrics
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Layers (Request ID → Trace → CORS → Admission → Body limit)│
//! ├─────────────────────────────────────────────────────────────┤
//! │  Admission chain (client identity → rate limit → bearer)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (health, translation, price, negotiation, ...)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Services (Translation + cache, PriceDiscovery,             │
//! │            Negotiation, CulturalContext)                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vendor_ai_services::{AppState, Config, build_router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let state = AppState::new(config);
//!     state.initialize_services().await?;
//!
//!     let app = build_router(state.clone());
//!     // Serve with `into_make_service_with_connect_info::<SocketAddr>()`...
//!
//!     state.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Security Configuration
//!
//! ```bash
//! JWT_SECRET=change-me JWT_ALGORITHM=HS256 cargo run
//! RATE_LIMIT_REQUESTS=60 RATE_LIMIT_WINDOW_SECS=60 cargo run
//! ```

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
pub mod validation;

// Re-exports for convenience
pub use auth::{AuthenticatedUser, TokenVerifier};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use limiter::{Decision, SlidingWindowLimiter};
pub use routes::build_router;
pub use state::AppState;
