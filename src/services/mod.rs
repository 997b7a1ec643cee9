//! Business services invoked after a request has been admitted.
//!
//! Every service follows the same lifecycle: `initialize` once before the
//! server accepts traffic, `cleanup` once after it stops. Between the two the
//! service reports ready; outside that span its operations fail with the
//! service's generic error message.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{AppError, AppResult};

mod cultural;
mod negotiation;
mod price_discovery;
mod translation;

pub use cultural::CulturalContextService;
pub use negotiation::NegotiationService;
pub use price_discovery::PriceDiscoveryService;
pub use translation::{CONFIDENCE_THRESHOLD, TranslationService};

/// Lifecycle contract shared by all business services.
pub trait AiService: Send + Sync {
    /// Name used in logs and metrics.
    const NAME: &'static str;

    /// Prepare the service for traffic. A failure aborts startup.
    fn initialize(&self) -> impl Future<Output = AppResult<()>> + Send;

    /// Release per-service state. Errors are logged by the caller.
    fn cleanup(&self) -> impl Future<Output = AppResult<()>> + Send;

    fn is_ready(&self) -> bool;
}

/// Ready flag shared between clones of a service.
///
/// Uses `SeqCst` because readiness gates control flow in request handlers.
#[derive(Debug, Clone, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn mark_stopped(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fail with `public_message` unless the service is ready.
    pub fn ensure(&self, service: &str, public_message: &'static str) -> AppResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(AppError::service(
                public_message,
                format!("{service} service is not initialized"),
            ))
        }
    }
}

/// Convert a configured capacity to the width Moka expects.
pub(crate) fn capacity(size: usize) -> u64 {
    u64::try_from(size).unwrap_or(u64::MAX)
}
