// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics, API_REQUESTS, API_REQUEST_DURATION, CACHE_OPERATIONS, SESSION_EVENTS,
    TOKEN_REFRESHES,
};

/// Helper to record a completed backend request.
///
/// `status` is `None` when no response was received.
pub fn record_api_request(method: &str, path: &str, status: Option<u16>, duration_secs: f64) {
    let endpoint = endpoint_label(path);
    let status = status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "network_error".to_string());

    API_REQUESTS
        .with_label_values(&[method, &endpoint, &status])
        .inc();

    API_REQUEST_DURATION
        .with_label_values(&[method, &endpoint])
        .observe(duration_secs);
}

/// Helper to record cache operations
pub fn record_cache_operation(operation: &str) {
    CACHE_OPERATIONS.with_label_values(&[operation]).inc();
}

/// Helper to record session lifecycle transitions
pub fn record_session_event(event: &str) {
    SESSION_EVENTS.with_label_values(&[event]).inc();
}

pub fn record_token_refresh(success: bool) {
    let status = if success { "success" } else { "failure" };
    TOKEN_REFRESHES.with_label_values(&[status]).inc();
}

/// Collapse resource ids and query strings so label cardinality stays bounded.
///
/// `/transactions/42/` becomes `/transactions/{id}/`.
pub fn endpoint_label(path: &str) -> String {
    let path = path.split('?').next().unwrap_or(path);
    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
