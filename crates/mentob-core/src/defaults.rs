//! Default configuration values.
//!
//! Centralized default constants for use across all crates.

// ============================================================================
// Server Defaults
// ============================================================================

/// Default HTTP listen address.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:5000";
/// Default graceful shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Quota Defaults
// ============================================================================

/// Default number of free interpretations per user per UTC day.
pub const DEFAULT_FREE_DAILY_QUOTA: u32 = 3;
/// Remaining-quota value reported for unlimited users.
pub const UNLIMITED_REMAINING: u32 = 999_999;
/// Default demo account identifier.
pub const DEFAULT_DEMO_USER_ID: &str = "demo-user-id";
/// Demo account enabled by default.
pub const DEFAULT_DEMO_ENABLED: bool = true;

// ============================================================================
// Request Limits
// ============================================================================

/// Default number of history entries returned when no limit is given.
pub const DEFAULT_HISTORY_PAGE: usize = 20;
/// Hard ceiling on history entries per request.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
/// Maximum question length in characters.
pub const DEFAULT_MAX_QUESTION_LENGTH: usize = 500;
/// Maximum cards per reading.
pub const DEFAULT_MAX_CARDS_PER_READING: usize = 10;
/// Cap on the accumulated interpretation text (256 KiB).
pub const DEFAULT_MAX_INTERPRETATION_BYTES: usize = 256 * 1024;
/// Capacity of the channel between the interpretation task and the response body.
pub const DEFAULT_STREAM_CHANNEL_CAPACITY: usize = 32;

// ============================================================================
// LLM Defaults
// ============================================================================

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
/// Default model name.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
/// Default sampling temperature.
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.8;
/// Default temperature for follow-up question generation.
pub const DEFAULT_FOLLOWUP_TEMPERATURE: f32 = 0.7;
/// Default LLM connect timeout in seconds.
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default maximum silence between two streamed LLM reads, in seconds.
pub const DEFAULT_LLM_READ_TIMEOUT_SECS: u64 = 60;
/// Longest single line accepted from an LLM event stream, in bytes.
pub const DEFAULT_LLM_MAX_EVENT_BYTES: usize = 1024 * 1024;
/// Default follow-up generation timeout in seconds.
pub const DEFAULT_FOLLOWUP_TIMEOUT_SECS: u64 = 5;
/// Default LLM provider.
pub const DEFAULT_LLM_PROVIDER: &str = "openai";

/// Default system prompt for tarot interpretation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an experienced tarot reader with deep insight. \
Your task:
1. Give a professional, thoughtful and illuminating reading based on the user's question and the drawn cards.
2. Combine each card's meaning with its position and analyse how the cards relate to one another.
3. Offer practical advice and guidance.
4. Be warm and empathetic while keeping a mystical, professional tone.
5. Be thorough but concise, focusing on what matters.

Structure:
- Opening: a short summary of the overall mood of the spread
- Body: a card-by-card reading tied to each position
- Closing: an overall analysis and advice";

// ============================================================================
// Persistence Defaults
// ============================================================================

/// Default database URL (in-memory SQLite).
pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
/// Default maximum pool connections.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
/// Default minimum pool connections.
pub const DEFAULT_DB_MIN_CONNECTIONS: u32 = 1;
/// Default pool acquire timeout in seconds.
pub const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 30;
/// Create tables on startup.
pub const DEFAULT_DB_AUTO_MIGRATE: bool = true;
/// Pooled connections are recycled after this many seconds.
pub const DEFAULT_DB_MAX_LIFETIME_SECS: u64 = 30 * 60;
/// Idle pooled connections are closed after this many seconds.
pub const DEFAULT_DB_IDLE_TIMEOUT_SECS: u64 = 10 * 60;

// ============================================================================
// Billing Defaults
// ============================================================================

/// Default billing backend URL.
pub const DEFAULT_BILLING_BACKEND_URL: &str = "http://127.0.0.1:8901";
/// Default checkout success URL.
pub const DEFAULT_CHECKOUT_SUCCESS_URL: &str = "http://localhost:5000/?payment=success";
/// Default checkout cancel URL.
pub const DEFAULT_CHECKOUT_CANCEL_URL: &str = "http://localhost:5000/pricing";
/// Default billing request timeout in seconds.
pub const DEFAULT_BILLING_TIMEOUT_SECS: u64 = 15;

// ============================================================================
// Logging Defaults
// ============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Default log output format.
pub const DEFAULT_LOG_FORMAT: &str = "pretty";
