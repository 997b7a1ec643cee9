//! Prometheus metrics for application observability.
//!
//! Metrics are exposed via a dedicated HTTP listener (`METRICS_PORT`,
//! default 9090, 0 = disabled).
//!
//! # Available Metrics
//!
//! ## Counters
//! - `vendor_ai_admission_rejections_total` - Requests stopped before a handler (labels: check, reason)
//! - `vendor_ai_auth_failures_total` - Failed token verifications (labels: reason)
//! - `vendor_ai_cache_lookups_total` - Cache lookups (labels: cache, result)
//! - `vendor_ai_service_calls_total` - Business service calls (labels: service, operation, outcome)
//!
//! ## Histograms
//! - `vendor_ai_service_call_duration_seconds` - Service call duration (labels: service, operation)
//!
//! ## Gauges
//! - `vendor_ai_rate_limit_clients` - Clients currently holding rate-limit state
//!
//! # Usage
//!
//! ```rust,ignore
//! use vendor_ai_services::metrics::{try_init_metrics, record_cache_lookup};
//!
//! try_init_metrics(addr);
//! record_cache_lookup("translation", true);
//! ```

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const ADMISSION_REJECTIONS_TOTAL: &str = "vendor_ai_admission_rejections_total";
    pub const AUTH_FAILURES_TOTAL: &str = "vendor_ai_auth_failures_total";
    pub const CACHE_LOOKUPS_TOTAL: &str = "vendor_ai_cache_lookups_total";
    pub const SERVICE_CALLS_TOTAL: &str = "vendor_ai_service_calls_total";
    pub const SERVICE_CALL_DURATION_SECONDS: &str = "vendor_ai_service_call_duration_seconds";
    pub const RATE_LIMIT_CLIENTS: &str = "vendor_ai_rate_limit_clients";
}

/// Initialize the Prometheus metrics exporter.
///
/// Installs the global recorder, starts the HTTP listener on `metrics_addr`
/// and registers metric descriptions.
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::ADMISSION_REJECTIONS_TOTAL,
        "Requests rejected by the admission chain before reaching a handler"
    );
    describe_counter!(
        names::AUTH_FAILURES_TOTAL,
        "Bearer token verifications that failed"
    );
    describe_counter!(
        names::CACHE_LOOKUPS_TOTAL,
        "Cache lookups, labelled hit or miss"
    );
    describe_counter!(
        names::SERVICE_CALLS_TOTAL,
        "Business service calls by outcome"
    );

    describe_histogram!(
        names::SERVICE_CALL_DURATION_SECONDS,
        "Business service call duration in seconds"
    );

    describe_gauge!(
        names::RATE_LIMIT_CLIENTS,
        "Clients currently tracked by the request rate limiter"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

// =============================================================================
// Counters
// =============================================================================

/// Record a request stopped by an admission check.
pub fn record_admission_rejection(check: &'static str, reason: &'static str) {
    counter!(names::ADMISSION_REJECTIONS_TOTAL, "check" => check, "reason" => reason).increment(1);
}

/// Record a failed token verification.
pub fn record_auth_failure(reason: &'static str) {
    counter!(names::AUTH_FAILURES_TOTAL, "reason" => reason).increment(1);
}

/// Record a cache lookup.
pub fn record_cache_lookup(cache: &'static str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!(names::CACHE_LOOKUPS_TOTAL, "cache" => cache, "result" => result).increment(1);
}

/// Record a completed business service call.
pub fn record_service_call(
    service: &'static str,
    operation: &'static str,
    outcome: &'static str,
    duration_secs: f64,
) {
    counter!(names::SERVICE_CALLS_TOTAL, "service" => service, "operation" => operation, "outcome" => outcome)
        .increment(1);
    histogram!(names::SERVICE_CALL_DURATION_SECONDS, "service" => service, "operation" => operation)
        .record(duration_secs);
}

// =============================================================================
// Gauges
// =============================================================================

/// Update the tracked rate-limit client gauge.
pub fn set_rate_limit_clients(count: usize) {
    gauge!(names::RATE_LIMIT_CLIENTS).set(count as f64);
}
