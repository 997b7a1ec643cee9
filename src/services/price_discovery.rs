use std::sync::Arc;

use moka::future::Cache;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use super::{AiService, Readiness, capacity};
use crate::cache::lru_cache;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{JsonObject, PriceRange, PriceRecommendation};

pub const PRICE_RECOMMENDATION_FAILED: &str = "Price recommendation failed";

/// Market-based price suggestions.
///
/// Pricing models are keyed by product category and held in a bounded cache
/// that is emptied on cleanup. No model is loaded yet, so recommendations
/// are a fixed band around 100.
#[derive(Clone)]
pub struct PriceDiscoveryService {
    model_cache: Cache<String, Arc<JsonObject>>,
    readiness: Readiness,
}

impl PriceDiscoveryService {
    pub fn new(model_cache_size: usize) -> Self {
        Self {
            model_cache: lru_cache("price_models", capacity(model_cache_size)),
            readiness: Readiness::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.price_model_cache_size)
    }

    #[instrument(
        skip_all,
        fields(
            product_keys = product_info.len(),
            vendor_keys = vendor_info.len(),
            location_keys = location_info.len()
        )
    )]
    pub async fn price_recommendation(
        &self,
        product_info: &JsonObject,
        vendor_info: &JsonObject,
        location_info: &JsonObject,
    ) -> AppResult<PriceRecommendation> {
        self.readiness.ensure(Self::NAME, PRICE_RECOMMENDATION_FAILED)?;

        Ok(PriceRecommendation {
            suggested_price: Decimal::new(100, 0),
            price_range: PriceRange {
                min: Decimal::new(80, 0),
                max: Decimal::new(120, 0),
            },
            confidence: 0.85,
            reasoning: vec![
                "Based on market analysis".to_string(),
                "Seasonal factors considered".to_string(),
            ],
            market_factors: Vec::new(),
            seasonal_adjustments: Decimal::ZERO,
        })
    }

    pub fn model_cache(&self) -> &Cache<String, Arc<JsonObject>> {
        &self.model_cache
    }
}

impl AiService for PriceDiscoveryService {
    const NAME: &'static str = "price_discovery";

    async fn initialize(&self) -> AppResult<()> {
        info!("Initializing price discovery service...");
        self.readiness.mark_ready();
        info!("Price discovery service initialized");
        Ok(())
    }

    async fn cleanup(&self) -> AppResult<()> {
        info!("Cleaning up price discovery service...");
        self.readiness.mark_stopped();
        self.model_cache.invalidate_all();
        self.model_cache.run_pending_tasks().await;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }
}
