//! Configuration type definitions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub demo: DemoConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address, e.g. 0.0.0.0:5000
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Seconds to wait for in-flight requests on shutdown.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Free interpretations per user per UTC day.
    #[serde(default = "default_free_daily_quota")]
    pub free_daily: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            free_daily: default_free_daily_quota(),
        }
    }
}

/// The demo account skips quota accounting entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_demo_enabled")]
    pub enabled: bool,
    #[serde(default = "default_demo_user_id")]
    pub user_id: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: default_demo_enabled(),
            user_id: default_demo_user_id(),
        }
    }
}

impl DemoConfig {
    /// The demo account id, if the demo account is enabled.
    pub fn account(&self) -> Option<&str> {
        self.enabled.then_some(self.user_id.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Backend: "openai" (any OpenAI-compatible endpoint) or "scripted".
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Sampling temperature (0.0 - 2.0).
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Provider reasoning toggle; not sent when unset.
    #[serde(default)]
    pub thinking: Option<bool>,
    #[serde(default = "default_llm_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Maximum silence between streamed reads.
    #[serde(default = "default_llm_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Deadline for follow-up question generation before the fallback is used.
    #[serde(default = "default_followup_timeout_secs")]
    pub followup_timeout_secs: u64,
    /// Upper bound on one raw stream line from the provider.
    #[serde(default = "default_llm_max_event_bytes")]
    pub max_event_bytes: usize,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Fragments replayed by the scripted provider.
    #[serde(default)]
    pub scripted_chunks: Vec<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            base_url: default_llm_base_url(),
            api_key: String::new(),
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            max_tokens: None,
            thinking: None,
            connect_timeout_secs: default_llm_connect_timeout_secs(),
            read_timeout_secs: default_llm_read_timeout_secs(),
            followup_timeout_secs: default_followup_timeout_secs(),
            max_event_bytes: default_llm_max_event_bytes(),
            system_prompt: default_system_prompt(),
            scripted_chunks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (postgres://, mysql://, sqlite:) or "memory" for the
    /// process-local store.
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_db_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_db_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_db_auto_migrate")]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_db_max_connections(),
            min_connections: default_db_min_connections(),
            connect_timeout_secs: default_db_connect_timeout_secs(),
            auto_migrate: default_db_auto_migrate(),
        }
    }
}

impl DatabaseConfig {
    /// Whether the process-local store was selected.
    pub fn is_memory(&self) -> bool {
        self.url.eq_ignore_ascii_case("memory")
    }
}

/// External billing backend the checkout endpoints proxy to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    #[serde(default = "default_billing_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_checkout_success_url")]
    pub success_url: String,
    #[serde(default = "default_checkout_cancel_url")]
    pub cancel_url: String,
    #[serde(default = "default_billing_timeout_secs")]
    pub timeout_secs: u64,
    /// Publishable key handed to the frontend, if any.
    #[serde(default)]
    pub publishable_key: Option<String>,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            backend_url: default_billing_backend_url(),
            success_url: default_checkout_success_url(),
            cancel_url: default_checkout_cancel_url(),
            timeout_secs: default_billing_timeout_secs(),
            publishable_key: None,
        }
    }
}

/// Request and buffer limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum question length in characters.
    #[serde(default = "default_max_question_length")]
    pub max_question_length: usize,
    #[serde(default = "default_max_cards_per_reading")]
    pub max_cards_per_reading: usize,
    /// Cap on accumulated interpretation text (bytes).
    #[serde(default = "default_max_interpretation_bytes")]
    pub max_interpretation_bytes: usize,
    /// History entries returned when the client gives no limit.
    #[serde(default = "default_history_page")]
    pub history_default: usize,
    /// Hard ceiling on history entries per request.
    #[serde(default = "default_history_limit")]
    pub history_max: usize,
    #[serde(default = "default_stream_channel_capacity")]
    pub stream_channel_capacity: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_question_length: default_max_question_length(),
            max_cards_per_reading: default_max_cards_per_reading(),
            max_interpretation_bytes: default_max_interpretation_bytes(),
            history_default: default_history_page(),
            history_max: default_history_limit(),
            stream_channel_capacity: default_stream_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetricsConfig {
    /// Prometheus exporter listen address; disabled when unset.
    pub listen: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: Option<String>,
    /// Log format: json, pretty, or compact. Default: pretty.
    pub format: Option<String>,
    /// Output target: stdout or stderr. Default: stderr.
    pub output: Option<String>,
    /// Per-module log level filters (e.g., {"mentob_store": "debug", "sqlx": "warn"}).
    #[serde(default)]
    pub filters: HashMap<String, String>,
}
