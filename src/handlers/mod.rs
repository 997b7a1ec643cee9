//! HTTP handlers, one module per service.
//!
//! Handlers validate input, call the service under `SERVICE_TIMEOUT_SECS`
//! and return its result as JSON. Every failure becomes an [`AppError`]
//! rendered with the standard envelope.

mod cultural;
mod extract;
mod health;
mod negotiation;
mod price_discovery;
mod translation;

use std::future::Future;
use std::time::Instant;

use tokio::time::timeout;
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::state::AppState;

pub use cultural::cultural_guidance;
pub use extract::ApiJson;
pub use health::health_check;
pub use negotiation::start_negotiation;
pub use price_discovery::recommend_price;
pub use translation::{supported_languages, translate, translate_voice};

/// Run a service operation with the configured timeout and record its outcome.
pub(crate) async fn call_service<T, F>(
    state: &AppState,
    service: &'static str,
    operation: &'static str,
    call: F,
) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    let limit = state.config.service_timeout;
    let start = Instant::now();

    let result = match timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::OperationTimeout(format!(
            "{service}.{operation} exceeded {}s",
            limit.as_secs()
        ))),
    };

    let outcome = match &result {
        Ok(_) => "ok",
        Err(AppError::OperationTimeout(_)) => "timeout",
        Err(_) => "error",
    };
    metrics::record_service_call(service, operation, outcome, start.elapsed().as_secs_f64());

    if let Err(e) = &result {
        error!(service, operation, error = %e, "Service call failed");
    }

    result
}
