//! Prometheus Metrics Module
//!
//! Exposes history engine metrics in Prometheus format.
//!
//! # Metrics Categories
//!
//! - **Queries**: dispatched queries by path, failures by reason
//! - **Bars**: bars delivered per vendor or gateway
//! - **Sessions**: vendor session initializations by outcome
//! - **Latency**: end-to-end query duration
//! - **Queue**: jobs waiting for a worker
//!
//! # Integration
//!
//! When a port is configured, the exporter serves `/metrics` over its own
//! HTTP listener.

use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// With `Some(port)` the exporter also serves `/metrics` on
/// `0.0.0.0:{port}`; this must be called inside a tokio runtime. A second
/// call returns the handle installed by the first.
pub fn init_metrics(port: Option<u16>) -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = match port {
        Some(port) => {
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            let (recorder, exporter) = PrometheusBuilder::new()
                .with_http_listener(addr)
                .build()?;
            let handle = recorder.handle();
            metrics::set_global_recorder(recorder)
                .map_err(BuildError::FailedToSetGlobalRecorder)?;
            tokio::spawn(async move {
                if exporter.await.is_err() {
                    tracing::error!("metrics listener stopped");
                }
            });
            tracing::info!(%addr, "metrics listener started");
            handle
        }
        None => PrometheusBuilder::new().install_recorder()?,
    };

    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "history_queries_total",
        "Total history queries dispatched, by serving path"
    );
    describe_counter!(
        "history_query_failures_total",
        "Total history queries that failed, by reason"
    );
    describe_counter!(
        "history_bars_delivered_total",
        "Total bars delivered in result events"
    );
    describe_counter!(
        "history_session_inits_total",
        "Vendor session initialization attempts by outcome"
    );
    describe_histogram!(
        "history_query_duration_seconds",
        "Time from job pickup to result publication"
    );
    describe_gauge!(
        "history_queue_depth",
        "History jobs waiting for a worker"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Which path served a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPath {
    /// Native gateway history.
    Gateway,
    /// External data vendor.
    Vendor,
    /// Contract could not be resolved.
    Unresolved,
}

impl QueryPath {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::Vendor => "vendor",
            Self::Unresolved => "unresolved",
        }
    }
}

/// Record a query picked up by a worker.
pub fn record_query(path: QueryPath) {
    counter!("history_queries_total", "path" => path.as_str()).increment(1);
}

/// Record a failed query.
pub fn record_query_failure(reason: &'static str) {
    counter!("history_query_failures_total", "reason" => reason).increment(1);
}

/// Record bars delivered from a source.
pub fn record_bars_delivered(source: &str, count: usize) {
    counter!("history_bars_delivered_total", "source" => source.to_string())
        .increment(u64::try_from(count).unwrap_or(u64::MAX));
}

/// Record a vendor session initialization attempt.
pub fn record_session_init(vendor: &'static str, outcome: &'static str) {
    counter!(
        "history_session_inits_total",
        "vendor" => vendor,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record end-to-end query duration.
pub fn record_query_duration(path: QueryPath, duration: Duration) {
    histogram!("history_query_duration_seconds", "path" => path.as_str())
        .record(duration.as_secs_f64());
}

/// Adjust the queued job gauge.
pub fn adjust_queue_depth(delta: f64) {
    gauge!("history_queue_depth").increment(delta);
}

// =============================================================================
// Tests
// =============================================================================
