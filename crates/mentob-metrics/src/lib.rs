//! Metrics collection and Prometheus exporter for mentob.
//!
//! Covers HTTP traffic, the interpretation lifecycle, quota decisions and
//! calls to the LLM and billing backends. Recording is a no-op until an
//! exporter is installed.

use std::net::SocketAddr;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Initialize Prometheus metrics exporter.
///
/// Starts an HTTP server on the given address to expose metrics.
/// Returns an error message if binding fails.
pub fn init_prometheus(listen: &str) -> Result<(), String> {
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| format!("invalid metrics listen address: {}", e))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("failed to install prometheus exporter: {}", e))?;

    Ok(())
}

// ============================================================================
// Metric Names
// ============================================================================

/// Total HTTP requests by route and status.
pub const HTTP_REQUESTS_TOTAL: &str = "mentob_http_requests_total";
/// Total interpretations that passed validation and the quota check.
pub const INTERPRETATIONS_STARTED_TOTAL: &str = "mentob_interpretations_started_total";
/// Total interpretations persisted and charged.
pub const INTERPRETATIONS_COMPLETED_TOTAL: &str = "mentob_interpretations_completed_total";
/// Total interpretations that ended without a record, by reason.
pub const INTERPRETATIONS_FAILED_TOTAL: &str = "mentob_interpretations_failed_total";
/// Number of interpretations currently streaming.
pub const INTERPRETATIONS_ACTIVE: &str = "mentob_interpretations_active";
/// Interpretation duration histogram (seconds).
pub const INTERPRETATION_DURATION_SECONDS: &str = "mentob_interpretation_duration_seconds";
/// Interpretation length histogram (bytes).
pub const INTERPRETATION_BYTES: &str = "mentob_interpretation_bytes";
/// Total text fragments received from the LLM.
pub const LLM_FRAGMENTS_TOTAL: &str = "mentob_llm_fragments_total";
/// Total quota units consumed.
pub const QUOTA_CONSUMED_TOTAL: &str = "mentob_quota_consumed_total";
/// Total requests refused because the daily quota was exhausted.
pub const QUOTA_REJECTED_TOTAL: &str = "mentob_quota_rejected_total";
/// Total follow-up requests answered with the fallback questions.
pub const FOLLOWUP_FALLBACK_TOTAL: &str = "mentob_followup_fallback_total";
/// Total billing backend calls by endpoint and outcome.
pub const BILLING_REQUESTS_TOTAL: &str = "mentob_billing_requests_total";
/// Total number of errors by type.
pub const ERRORS_TOTAL: &str = "mentob_errors_total";

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a finished HTTP request.
/// `route` should be the matched route template, not the raw path, to keep
/// label cardinality bounded.
#[inline]
pub fn record_http_request(route: &str, status: u16) {
    counter!(HTTP_REQUESTS_TOTAL, "route" => route.to_owned(), "status" => status.to_string())
        .increment(1);
}

/// Record an interpretation entering the streaming state.
#[inline]
pub fn record_interpretation_started() {
    counter!(INTERPRETATIONS_STARTED_TOTAL).increment(1);
    gauge!(INTERPRETATIONS_ACTIVE).increment(1.0);
}

/// Record an interpretation that was persisted.
#[inline]
pub fn record_interpretation_completed(duration_secs: f64, bytes: usize) {
    counter!(INTERPRETATIONS_COMPLETED_TOTAL).increment(1);
    gauge!(INTERPRETATIONS_ACTIVE).decrement(1.0);
    histogram!(INTERPRETATION_DURATION_SECONDS).record(duration_secs);
    histogram!(INTERPRETATION_BYTES).record(bytes as f64);
}

/// Record an interpretation that ended without a record
/// (reason: "llm", "overflow", "disconnect", "store").
#[inline]
pub fn record_interpretation_failed(reason: &'static str) {
    counter!(INTERPRETATIONS_FAILED_TOTAL, "reason" => reason).increment(1);
    gauge!(INTERPRETATIONS_ACTIVE).decrement(1.0);
}

/// Record a fragment received from the LLM.
#[inline]
pub fn record_llm_fragment() {
    counter!(LLM_FRAGMENTS_TOTAL).increment(1);
}

/// Record a consumed quota unit.
#[inline]
pub fn record_quota_consumed() {
    counter!(QUOTA_CONSUMED_TOTAL).increment(1);
}

/// Record a request refused for quota.
#[inline]
pub fn record_quota_rejected() {
    counter!(QUOTA_REJECTED_TOTAL).increment(1);
}

/// Record a follow-up answered from the fallback list.
#[inline]
pub fn record_followup_fallback() {
    counter!(FOLLOWUP_FALLBACK_TOTAL).increment(1);
}

/// Record a billing backend call (outcome: "ok" or "error").
#[inline]
pub fn record_billing_request(endpoint: &'static str, outcome: &'static str) {
    counter!(BILLING_REQUESTS_TOTAL, "endpoint" => endpoint, "outcome" => outcome).increment(1);
}

/// Record an error by type.
#[inline]
pub fn record_error(error_type: &'static str) {
    counter!(ERRORS_TOTAL, "type" => error_type).increment(1);
}

// ============================================================================
// Error Type Constants (re-exported from mentob-core)
// ============================================================================

pub use mentob_core::{
    ERROR_BILLING, ERROR_CONFIG, ERROR_DISCONNECT, ERROR_LLM, ERROR_NOT_FOUND, ERROR_OVERFLOW,
    ERROR_QUOTA, ERROR_STORE, ERROR_VALIDATION,
};
