//! Business metrics for registration admission.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `registration_admissions_total{outcome}` - Admission attempts by outcome
//!   (admitted, rejected, invalid, failed)
//! - `registration_rejections_total{reason}` - Rejections by reason code
//! - `registration_commit_failures_total{partial}` - Failed team writes
//! - `registration_notifications_total{status}` - Confirmation messages by status
//!
//! ## Histograms
//! - `registration_admission_duration_seconds` - Time from request to commit decision

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize and register all metric descriptions.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_registration_metrics() {
    describe_counter!(
        "registration_admissions_total",
        "Total number of admission attempts by outcome (admitted, rejected, invalid, failed)"
    );
    describe_counter!(
        "registration_rejections_total",
        "Total number of rejected registrations by reason"
    );
    describe_counter!(
        "registration_commit_failures_total",
        "Total number of registrations whose write failed"
    );
    describe_counter!(
        "registration_notifications_total",
        "Total number of confirmation messages by status (sent, failed)"
    );
    describe_histogram!(
        "registration_admission_duration_seconds",
        "Time taken to admit or reject a registration"
    );

    tracing::info!("Registration metrics registered");
}

/// Install the Prometheus exporter, serving `/metrics` on `addr`.
///
/// # Errors
///
/// Returns an error if the exporter cannot bind or a recorder is already installed.
pub fn install_prometheus_exporter(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    register_registration_metrics();
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record an admitted team.
pub fn record_admitted(team_size: u32, duration_secs: f64) {
    metrics::counter!("registration_admissions_total", "outcome" => "admitted").increment(1);
    metrics::histogram!("registration_admission_duration_seconds").record(duration_secs);
    tracing::debug!(team_size, duration_secs, "Recorded admission metric");
}

/// Record a rejection (capacity or duplicate).
pub fn record_rejected(reason: &'static str, duration_secs: f64) {
    metrics::counter!("registration_admissions_total", "outcome" => "rejected").increment(1);
    metrics::counter!("registration_rejections_total", "reason" => reason).increment(1);
    metrics::histogram!("registration_admission_duration_seconds").record(duration_secs);
    tracing::debug!(reason, "Recorded rejection metric");
}

/// Record a request that failed validation.
pub fn record_invalid() {
    metrics::counter!("registration_admissions_total", "outcome" => "invalid").increment(1);
}

/// Record a store read that failed before any write.
pub fn record_store_failure() {
    metrics::counter!("registration_admissions_total", "outcome" => "failed").increment(1);
}

/// Record a failed team write.
pub fn record_commit_failure(partial: bool) {
    metrics::counter!("registration_admissions_total", "outcome" => "failed").increment(1);
    metrics::counter!(
        "registration_commit_failures_total",
        "partial" => if partial { "true" } else { "false" }
    )
    .increment(1);
}

/// Record one confirmation message.
pub fn record_notification(sent: bool) {
    let status = if sent { "sent" } else { "failed" };
    metrics::counter!("registration_notifications_total", "status" => status).increment(1);
}
