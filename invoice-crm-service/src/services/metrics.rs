//! Metrics collection and Prometheus export.
//!
//! Installs the process-wide recorder and exposes the domain counters used by
//! the CRM operations.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;
use std::time::Duration;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder.
///
/// Call once at startup before any metrics are recorded. A second call is an
/// error because only one global recorder can exist.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("failed to install Prometheus recorder: {}", e))
    })?;

    METRICS_HANDLE.set(handle).map_err(|_| {
        AppError::ConfigError(anyhow::anyhow!("metrics handle already initialized"))
    })
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

pub fn record_company_created() {
    counter!("crm_companies_created_total").increment(1);
}

pub fn record_invoice_created() {
    counter!("crm_invoices_created_total").increment(1);
}

pub fn record_store_error(operation: &'static str) {
    counter!("crm_store_errors_total", "operation" => operation).increment(1);
}

pub fn record_store_duration(operation: &'static str, elapsed: Duration) {
    histogram!("crm_store_duration_seconds", "operation" => operation)
        .record(elapsed.as_secs_f64());
}
