//! `POST /api/v1/cultural/guidance`

use axum::Json;
use axum::extract::State;
use tracing::instrument;

use super::{ApiJson, call_service};
use crate::error::AppResult;
use crate::models::{CulturalGuidance, CulturalGuidanceRequest};
use crate::services::{AiService, CulturalContextService};
use crate::state::AppState;
use crate::validation::validate_identifier;

/// Cultural guidance for an action within a negotiation session.
///
/// # Request Body
///
/// ```json
/// { "sessionId": "neg_v1_b1_p1", "action": "counter_offer", "context": {} }
/// ```
#[instrument(skip(state, payload), fields(session_id = %payload.session_id))]
pub async fn cultural_guidance(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CulturalGuidanceRequest>,
) -> AppResult<Json<CulturalGuidance>> {
    validate_identifier(&payload.session_id, "sessionId")?;
    validate_identifier(&payload.action, "action")?;

    let guidance = call_service(
        &state,
        CulturalContextService::NAME,
        "cultural_guidance",
        state.cultural_context.cultural_guidance(
            &payload.session_id,
            &payload.action,
            &payload.context,
        ),
    )
    .await?;

    Ok(Json(guidance))
}
