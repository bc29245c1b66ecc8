//! Error kind constants for metrics and logging.
//!
//! These constants provide consistent error classification across all crates.

/// Request failed validation.
pub const ERROR_VALIDATION: &str = "validation";
/// Daily quota exhausted.
pub const ERROR_QUOTA: &str = "quota_exceeded";
/// LLM backend failure.
pub const ERROR_LLM: &str = "llm";
/// Storage failure.
pub const ERROR_STORE: &str = "store";
/// Billing backend failure.
pub const ERROR_BILLING: &str = "billing";
/// Unknown resource.
pub const ERROR_NOT_FOUND: &str = "not_found";
/// Interpretation exceeded the buffer cap.
pub const ERROR_OVERFLOW: &str = "overflow";
/// Client went away mid-stream.
pub const ERROR_DISCONNECT: &str = "disconnect";
/// Configuration error.
pub const ERROR_CONFIG: &str = "config";
