//! `POST /api/v1/price-discovery/recommend`

use axum::Json;
use axum::extract::State;
use tracing::instrument;

use super::{ApiJson, call_service};
use crate::error::AppResult;
use crate::models::{PriceRecommendation, PriceRecommendationRequest};
use crate::services::{AiService, PriceDiscoveryService};
use crate::state::AppState;

/// Suggest a price for a product.
///
/// # Request Body
///
/// ```json
/// { "productInfo": {}, "vendorInfo": {}, "locationInfo": {} }
/// ```
#[instrument(skip(state, payload))]
pub async fn recommend_price(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PriceRecommendationRequest>,
) -> AppResult<Json<PriceRecommendation>> {
    let recommendation = call_service(
        &state,
        PriceDiscoveryService::NAME,
        "price_recommendation",
        state.price_discovery.price_recommendation(
            &payload.product_info,
            &payload.vendor_info,
            &payload.location_info,
        ),
    )
    .await?;

    Ok(Json(recommendation))
}
