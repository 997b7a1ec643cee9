//! Shared application state for Axum handlers.
//!
//! This module provides thread-safe, clonable state that is shared across
//! all request handlers. It includes:
//!
//! - **Services**: translation, price discovery, negotiation, cultural context
//! - **Admission state**: request rate limiter, token verifier, auth-failure guard
//! - **Configuration**: Runtime configuration access
//!
//! # Structured Concurrency
//!
//! Background tasks are managed using `tokio_util::task::TaskTracker` and
//! `CancellationToken`. Call `shutdown()` to stop them and clean up the
//! services before application exit.

use std::sync::Arc;

use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, trace};

use crate::auth::TokenVerifier;
use crate::config::Config;
use crate::error::AppResult;
use crate::limiter::SlidingWindowLimiter;
use crate::metrics;
use crate::middleware::AuthFailureGuard;
use crate::models::ServicesHealth;
use crate::services::{
    AiService, CulturalContextService, NegotiationService, PriceDiscoveryService,
    TranslationService,
};

/// Shared application state for Axum handlers.
///
/// Cloned for each request; all internal data is behind `Arc` or is itself
/// a cheap handle.
///
/// # Lifecycle
///
/// ```rust,ignore
/// let state = AppState::new(config);
/// state.initialize_services().await?;  // before serving
/// // ... serve ...
/// state.shutdown().await;              // after the server stops
/// ```
#[derive(Clone)]
pub struct AppState {
    pub translation: TranslationService,
    pub price_discovery: PriceDiscoveryService,
    pub negotiation: NegotiationService,
    pub cultural_context: CulturalContextService,
    pub rate_limiter: Arc<SlidingWindowLimiter>,
    pub token_verifier: Arc<TokenVerifier>,
    /// `None` when `AUTH_FAILURE_LIMIT_PER_MINUTE=0`
    pub auth_failure_guard: Option<Arc<AuthFailureGuard>>,
    /// Application configuration
    pub config: Arc<Config>,
    /// Tracks spawned background tasks for graceful shutdown
    task_tracker: TaskTracker,
    /// Cancellation token for signaling background tasks to stop
    cancellation_token: CancellationToken,
}

impl AppState {
    /// Build services and admission state from configuration.
    ///
    /// Spawns the idle-client sweep, so this must run inside a Tokio runtime.
    /// Services are constructed but not yet ready; call
    /// [`initialize_services`](Self::initialize_services) before serving.
    pub fn new(config: Config) -> Self {
        let rate_limiter = Arc::new(SlidingWindowLimiter::new(
            config.rate_limit_requests,
            config.rate_limit_window,
        ));
        let token_verifier = Arc::new(TokenVerifier::new(&config.jwt_secret, config.jwt_algorithm));
        let auth_failure_guard =
            AuthFailureGuard::new(config.auth_failure_limit_per_minute, config.auth_failure_burst)
                .map(Arc::new);

        let state = Self {
            translation: TranslationService::from_config(&config),
            price_discovery: PriceDiscoveryService::from_config(&config),
            negotiation: NegotiationService::from_config(&config),
            cultural_context: CulturalContextService::from_config(&config),
            rate_limiter,
            token_verifier,
            auth_failure_guard,
            config: Arc::new(config),
            task_tracker: TaskTracker::new(),
            cancellation_token: CancellationToken::new(),
        };

        state.spawn_idle_client_sweep();

        state
    }

    /// Initialize every service. The first failure is returned and should
    /// abort startup.
    pub async fn initialize_services(&self) -> AppResult<()> {
        initialize(&self.translation).await?;
        initialize(&self.price_discovery).await?;
        initialize(&self.negotiation).await?;
        initialize(&self.cultural_context).await?;
        info!("All services initialized");
        Ok(())
    }

    /// Readiness of each service, as reported by `/health`.
    pub fn services_health(&self) -> ServicesHealth {
        ServicesHealth {
            translation: self.translation.is_ready().into(),
            price_discovery: self.price_discovery.is_ready().into(),
            negotiation: self.negotiation.is_ready().into(),
            cultural_context: self.cultural_context.is_ready().into(),
        }
    }

    /// Spawn the periodic sweep of idle admission state.
    ///
    /// Clients whose newest request has left the rate-limit window are
    /// dropped, along with expired auth-failure blocks.
    fn spawn_idle_client_sweep(&self) {
        let limiter = Arc::clone(&self.rate_limiter);
        let guard = self.auth_failure_guard.clone();
        let period = self.config.rate_limit_cleanup_interval;
        let cancel = self.cancellation_token.clone();

        self.task_tracker.spawn(async move {
            let mut ticker = interval(period);
            ticker.tick().await; // Skip the first immediate tick

            loop {
                tokio::select! {
                    biased;

                    _ = cancel.cancelled() => {
                        debug!("Idle client sweep received cancellation signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        let evicted = limiter.evict_idle();
                        if let Some(guard) = &guard {
                            guard.sweep();
                        }
                        let tracked = limiter.tracked_clients();
                        metrics::set_rate_limit_clients(tracked);
                        trace!(evicted, tracked, "Idle client sweep complete");
                    }
                }
            }

            debug!("Idle client sweep shutting down");
        });
    }

    /// Stop background tasks, then clean up every service.
    ///
    /// Cleanup is best effort: failures are logged and the remaining services
    /// are still cleaned up.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown of background tasks");

        self.cancellation_token.cancel();
        self.task_tracker.close();
        self.task_tracker.wait().await;

        info!("All background tasks have completed");

        cleanup(&self.translation).await;
        cleanup(&self.price_discovery).await;
        cleanup(&self.negotiation).await;
        cleanup(&self.cultural_context).await;

        info!("All services cleaned up");
    }
}

async fn initialize<S: AiService>(service: &S) -> AppResult<()> {
    service.initialize().await.inspect_err(|e| {
        error!(service = S::NAME, error = %e, "Service initialization failed");
    })
}

async fn cleanup<S: AiService>(service: &S) {
    if let Err(e) = service.cleanup().await {
        error!(service = S::NAME, error = %e, "Service cleanup failed");
    }
}
