//! Prometheus exposition
//!
//! Counters and histograms are recorded with the `metrics` macros
//! throughout the workspace; this module installs the recorder and serves
//! the rendered registry.

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if let Some(handle) = METRICS_HANDLE.get() {
        return Some(handle.clone());
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle.clone());
            Some(handle)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

/// Current exposition text, if a recorder is installed
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

pub async fn metrics_handler() -> impl IntoResponse {
    match render() {
        Some(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled\n").into_response(),
    }
}
