//! Prometheus metrics.
//!
//! # Counters
//!
//! | Metric | Labels | Description |
//! |--------|--------|-------------|
//! | `apiop_operations_total` | `format`, `outcome` | Normalized operations |
//! | `apiop_body_source_total` | `source` | Body extraction path taken |
//!
//! The counters are emitted by `apiop-parse` and `apiop-extract` through the
//! `metrics` facade. They are no-ops until a recorder is installed.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use ::metrics::describe_counter;
pub use apiop_core::metric_names::{BODY_SOURCE_TOTAL, OPERATIONS_TOTAL};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the Prometheus recorder and describes apiop's counters.
///
/// Calling it again after a successful install is a no-op.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if another recorder is already
/// installed.
pub fn init_metrics() -> TelemetryResult<()> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);

    register_metric_descriptions();

    Ok(())
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        OPERATIONS_TOTAL,
        "Total operations normalized, by response format and outcome"
    );
    describe_counter!(
        BODY_SOURCE_TOTAL,
        "Total request bodies extracted, by source (multipart, form, raw)"
    );
}
