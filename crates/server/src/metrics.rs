//! Application metrics for Prometheus monitoring.
//!
//! This module provides:
//! - Prometheus metrics recorder initialization
//! - Metric definitions (counters, histograms, gauges)
//! - Helper functions for recording metrics
//! - `/metrics` endpoint handler

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

/// Global Prometheus handle for rendering metrics.
///
/// `None` once initialization has run but another recorder was already
/// installed: the exporter would never see any samples.
static PROMETHEUS_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Call once at startup, before any metrics are recorded.
/// Returns `true` if this call installed the recorder.
pub fn init_metrics() -> bool {
    let mut installed = false;
    // Concurrent callers block here until the first one has finished.
    PROMETHEUS_HANDLE.get_or_init(|| {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        if metrics::set_global_recorder(recorder).is_err() {
            tracing::warn!("Failed to set global metrics recorder (already set)");
            return None;
        }
        describe_metrics();
        tracing::info!("Prometheus metrics initialized");
        installed = true;
        Some(handle)
    });
    installed
}

fn describe_metrics() {
    describe_counter!(
        "status_requests_total",
        "Total number of requests to job status endpoints"
    );
    describe_histogram!(
        "status_request_duration_seconds",
        "Duration of job status requests in seconds"
    );
    describe_counter!(
        "status_actions_total",
        "Operator actions (retry, delete) by outcome"
    );
    describe_gauge!(
        "status_list_total_size",
        "Matching job statuses in the most recent list request"
    );
}

/// Render current metrics in Prometheus text format.
///
/// Returns `None` if our recorder is not the installed one.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get()?.as_ref().map(|h| h.render())
}

/// Record a completed API request.
pub fn record_request(endpoint: &str, status: &str, duration: std::time::Duration) {
    counter!("status_requests_total", "endpoint" => endpoint.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!("status_request_duration_seconds", "endpoint" => endpoint.to_string())
        .record(duration.as_secs_f64());
}

/// Record an operator action (`retry` / `delete`) and its outcome.
pub fn record_action(action: &str, outcome: &str) {
    counter!("status_actions_total", "action" => action.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

pub fn record_list_size(total_size: usize) {
    gauge!("status_list_total_size").set(total_size as f64);
}

/// Helper for timing request handlers.
///
/// Usage:
/// ```ignore
/// let timer = RequestTimer::new("statuses_list");
/// // ... do work ...
/// timer.finish_ok(); // or timer.finish_err(status_code)
/// ```
pub struct RequestTimer {
    endpoint: &'static str,
    start: Instant,
}

impl RequestTimer {
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            start: Instant::now(),
        }
    }

    pub fn finish_ok(self) {
        record_request(self.endpoint, "200", self.start.elapsed());
    }

    pub fn finish_err(self, status: u16) {
        record_request(self.endpoint, &status.to_string(), self.start.elapsed());
    }

    /// Finish with the status of a handler result.
    pub fn finish_result<T>(self, result: &crate::ApiResult<T>) {
        match result {
            Ok(_) => self.finish_ok(),
            Err(crate::ApiError::StatusNotFound(_)) => self.finish_err(404),
            Err(crate::ApiError::BadRequest(_)) => self.finish_err(400),
            Err(crate::ApiError::Store(_)) => self.finish_err(500),
        }
    }
}
