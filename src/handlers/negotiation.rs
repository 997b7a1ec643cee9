//! `POST /api/v1/negotiation/start`

use axum::extract::State;
use axum::{Extension, Json};
use tracing::instrument;

use super::{ApiJson, call_service};
use crate::auth::AuthenticatedUser;
use crate::error::AppResult;
use crate::models::{NegotiationSession, StartNegotiationRequest};
use crate::services::{AiService, NegotiationService};
use crate::state::AppState;
use crate::validation::validate_identifier;

/// Open a negotiation session between a vendor and a buyer.
///
/// Requires an authenticated caller, so this path must not be listed in
/// `AUTH_BYPASS_PATHS`.
///
/// # Request Body
///
/// ```json
/// { "vendorId": "v1", "buyerId": "b1", "productId": "p1" }
/// ```
#[instrument(skip(state, user, payload), fields(caller = %user.subject_id))]
pub async fn start_negotiation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(payload): ApiJson<StartNegotiationRequest>,
) -> AppResult<Json<NegotiationSession>> {
    validate_identifier(&payload.vendor_id, "vendorId")?;
    validate_identifier(&payload.buyer_id, "buyerId")?;
    validate_identifier(&payload.product_id, "productId")?;

    let session = call_service(
        &state,
        NegotiationService::NAME,
        "start_negotiation",
        state.negotiation.start_negotiation(
            &payload.vendor_id,
            &payload.buyer_id,
            &payload.product_id,
        ),
    )
    .await?;

    Ok(Json(session))
}
