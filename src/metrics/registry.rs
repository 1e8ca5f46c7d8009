// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    Encoder, HistogramVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // API METRICS
    // ============================================================================

    /// Total number of backend requests, by outcome
    pub static ref API_REQUESTS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("api_requests_total", "Total number of backend API requests"),
        &["method", "endpoint", "status"], // status: HTTP code or "network_error"
        REGISTRY
    ).unwrap();

    /// Backend request duration histogram
    pub static ref API_REQUEST_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("api_request_duration_seconds", "Backend request duration in seconds")
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "endpoint"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // CACHE METRICS
    // ============================================================================

    /// Response cache operations
    pub static ref CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("cache_operations_total", "Total response cache operations"),
        &["operation"], // operation: hit, miss, store, expired, invalidate
        REGISTRY
    ).unwrap();

    // ============================================================================
    // SESSION METRICS
    // ============================================================================

    /// Session lifecycle transitions
    pub static ref SESSION_EVENTS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("session_events_total", "Total session lifecycle events"),
        &["event"], // event: authenticated, logged_out, expired
        REGISTRY
    ).unwrap();

    /// Access token refresh attempts
    pub static ref TOKEN_REFRESHES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("token_refreshes_total", "Total access token refreshes"),
        &["status"], // status: success, failure
        REGISTRY
    ).unwrap();
}

/// Render all registered metrics in the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}
