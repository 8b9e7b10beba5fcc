//! Prometheus metrics
//!
//! Counters are recorded across the workspace with the `metrics` macros;
//! this module installs the exporter and serves `/metrics`.

use axum::{http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder once per process
///
/// Returns `None` if another recorder was already installed.
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE
        .get_or_try_init(|| PrometheusBuilder::new().install_recorder())
        .map_err(|e| tracing::warn!(error = %e, "Failed to install metrics recorder"))
        .ok()
}

/// Record an HTTP-level error by kind
pub fn record_error(kind: &'static str) {
    metrics::counter!("concierge_errors_total", "kind" => kind).increment(1);
}

pub async fn metrics_handler() -> impl IntoResponse {
    match METRICS_HANDLE.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics disabled".to_string(),
        ),
    }
}
