use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Every service is ready
    Healthy,
    /// At least one service is not ready
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Ready,
    Unavailable,
}

impl From<bool> for ServiceStatus {
    fn from(ready: bool) -> Self {
        if ready {
            ServiceStatus::Ready
        } else {
            ServiceStatus::Unavailable
        }
    }
}

/// Per-service readiness as reported by `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct ServicesHealth {
    pub translation: ServiceStatus,
    pub price_discovery: ServiceStatus,
    pub negotiation: ServiceStatus,
    pub cultural_context: ServiceStatus,
}

impl ServicesHealth {
    pub fn all_ready(&self) -> bool {
        [
            self.translation,
            self.price_discovery,
            self.negotiation,
            self.cultural_context,
        ]
        .iter()
        .all(|s| *s == ServiceStatus::Ready)
    }
}

/// Health check response.
///
/// ```json
/// {
///   "status": "healthy",
///   "services": {
///     "translation": "ready",
///     "price_discovery": "ready",
///     "negotiation": "ready",
///     "cultural_context": "ready"
///   },
///   "version": "0.1.0",
///   "timestamp": "2024-01-15T10:30:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub services: ServicesHealth,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
