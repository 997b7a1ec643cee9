use std::sync::Arc;

use moka::future::Cache;
use tracing::{info, instrument};

use super::{AiService, Readiness, capacity};
use crate::cache::lru_cache;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{CulturalGuidance, JsonObject, Sensitivity};

pub const CULTURAL_GUIDANCE_FAILED: &str = "Failed to get cultural guidance";

/// Cultural guidance for negotiation sessions.
///
/// Regional rule sets live in a bounded cache keyed by region and are
/// dropped on cleanup.
#[derive(Clone)]
pub struct CulturalContextService {
    cultural_rules: Cache<String, Arc<JsonObject>>,
    readiness: Readiness,
}

impl CulturalContextService {
    pub fn new(rules_cache_size: usize) -> Self {
        Self {
            cultural_rules: lru_cache("cultural_rules", capacity(rules_cache_size)),
            readiness: Readiness::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cultural_context_cache_size)
    }

    #[instrument(skip(self, context), fields(context_keys = context.len()))]
    pub async fn cultural_guidance(
        &self,
        session_id: &str,
        action: &str,
        context: &JsonObject,
    ) -> AppResult<CulturalGuidance> {
        self.readiness.ensure(Self::NAME, CULTURAL_GUIDANCE_FAILED)?;

        Ok(CulturalGuidance {
            guidance: "Cultural guidance placeholder".to_string(),
            cultural_factors: Vec::new(),
            recommendations: Vec::new(),
            sensitivity: Sensitivity::Medium,
        })
    }

    pub fn cultural_rules(&self) -> &Cache<String, Arc<JsonObject>> {
        &self.cultural_rules
    }
}

impl AiService for CulturalContextService {
    const NAME: &'static str = "cultural_context";

    async fn initialize(&self) -> AppResult<()> {
        info!("Initializing cultural context service...");
        self.readiness.mark_ready();
        info!("Cultural context service initialized");
        Ok(())
    }

    async fn cleanup(&self) -> AppResult<()> {
        info!("Cleaning up cultural context service...");
        self.readiness.mark_stopped();
        self.cultural_rules.invalidate_all();
        self.cultural_rules.run_pending_tasks().await;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }
}
