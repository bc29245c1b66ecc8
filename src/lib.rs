//! # mentob
//!
//! Tarot readings interpreted by an LLM, streamed to the caller and gated by
//! a per-user daily quota.
//!
//! ## Crates
//!
//! - [`mentob_core`] - Tarot catalog, shared defaults and UTC day keys
//! - [`mentob_store`] - Quota and reading storage, the quota gate
//! - [`mentob_llm`] - Chat-completion clients and prompt construction
//! - [`mentob_config`] - Configuration loading and validation
//! - [`mentob_metrics`] - Prometheus-compatible metrics
//! - [`mentob_server`] - HTTP service

pub use mentob_config as config;
pub use mentob_core as core;
pub use mentob_llm as llm;
pub use mentob_metrics as metrics;
pub use mentob_server as server;
pub use mentob_store as store;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use mentob_config::{Config, load_config, validate_config};
    pub use mentob_llm::{LlmClient, OpenAiClient, ScriptedClient};
    pub use mentob_server::{AppState, CancellationToken, ServerError, run, run_with_shutdown};
    pub use mentob_store::{MemoryStore, QuotaGate, Store};
}
