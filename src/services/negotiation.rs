use std::time::Duration;

use moka::future::Cache;
use tracing::{info, instrument};

use super::{AiService, Readiness};
use crate::cache::ttl_lru_cache;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{JsonObject, NegotiationSession, NegotiationStatus};

pub const START_NEGOTIATION_FAILED: &str = "Failed to start negotiation";

/// Tracks negotiation sessions between vendors and buyers.
///
/// Session ids are derived from the participants and product, so starting the
/// same negotiation twice replaces the tracked session with a fresh one.
/// Sessions live in a bounded cache: they expire after a fixed lifetime and
/// the least recently used are evicted once the cache is full.
#[derive(Clone)]
pub struct NegotiationService {
    active_sessions: Cache<String, NegotiationSession>,
    readiness: Readiness,
}

impl NegotiationService {
    pub fn new(max_sessions: u64, session_ttl: Duration) -> Self {
        Self {
            active_sessions: ttl_lru_cache("negotiation_sessions", max_sessions, session_ttl),
            readiness: Readiness::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.negotiation_session_cache_size,
            config.negotiation_session_ttl,
        )
    }

    #[instrument(skip(self))]
    pub async fn start_negotiation(
        &self,
        vendor_id: &str,
        buyer_id: &str,
        product_id: &str,
    ) -> AppResult<NegotiationSession> {
        self.readiness.ensure(Self::NAME, START_NEGOTIATION_FAILED)?;

        let session = NegotiationSession {
            session_id: format!("neg_{vendor_id}_{buyer_id}_{product_id}"),
            participants: vec![vendor_id.to_string(), buyer_id.to_string()],
            product_id: product_id.to_string(),
            status: NegotiationStatus::Active,
            cultural_context: JsonObject::new(),
            negotiation_history: Vec::new(),
        };

        self.active_sessions
            .insert(session.session_id.clone(), session.clone())
            .await;

        info!(session_id = %session.session_id, "Negotiation session started");
        Ok(session)
    }

    pub async fn session(&self, session_id: &str) -> Option<NegotiationSession> {
        self.active_sessions.get(session_id).await
    }

    /// Number of tracked sessions once pending evictions have been applied.
    pub async fn active_session_count(&self) -> u64 {
        self.active_sessions.run_pending_tasks().await;
        self.active_sessions.entry_count()
    }
}

impl AiService for NegotiationService {
    const NAME: &'static str = "negotiation";

    async fn initialize(&self) -> AppResult<()> {
        info!("Initializing negotiation service...");
        self.readiness.mark_ready();
        info!("Negotiation service initialized");
        Ok(())
    }

    async fn cleanup(&self) -> AppResult<()> {
        info!(
            active_sessions = self.active_sessions.entry_count(),
            "Cleaning up negotiation service..."
        );
        self.readiness.mark_stopped();
        self.active_sessions.invalidate_all();
        self.active_sessions.run_pending_tasks().await;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }
}
