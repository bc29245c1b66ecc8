//! CLI override definitions and application logic.

use clap::Parser;

use crate::Config;

#[derive(Debug, Clone, Parser, Default)]
pub struct CliOverrides {
    /// Override HTTP listen address, e.g. 0.0.0.0:5000
    #[arg(long)]
    pub listen: Option<String>,
    /// Override free interpretations per user per day
    #[arg(long)]
    pub free_daily_quota: Option<u32>,
    /// Enable or disable the demo account
    #[arg(long)]
    pub demo_enabled: Option<bool>,
    /// Override the demo account id
    #[arg(long)]
    pub demo_user_id: Option<String>,
    /// LLM backend: openai or scripted
    #[arg(long)]
    pub llm_provider: Option<String>,
    /// OpenAI-compatible API base URL
    #[arg(long, env = "MENTOB_LLM_BASE_URL")]
    pub llm_base_url: Option<String>,
    /// API key for the LLM backend
    #[arg(long, env = "MENTOB_LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,
    /// Model name
    #[arg(long, env = "MENTOB_LLM_MODEL")]
    pub llm_model: Option<String>,
    /// Sampling temperature
    #[arg(long)]
    pub llm_temperature: Option<f32>,
    /// Database URL, or "memory" for the process-local store
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
    /// Billing backend base URL
    #[arg(long, env = "MENTOB_BILLING_URL")]
    pub billing_backend_url: Option<String>,
    /// Prometheus metrics listen address (0 disables)
    #[arg(long)]
    pub metrics_listen: Option<String>,
    /// Log level override
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) {
    if let Some(v) = &overrides.listen {
        config.server.listen = v.clone();
    }
    if let Some(v) = overrides.free_daily_quota {
        config.quota.free_daily = v;
    }
    if let Some(v) = overrides.demo_enabled {
        config.demo.enabled = v;
    }
    if let Some(v) = &overrides.demo_user_id {
        config.demo.user_id = v.clone();
    }
    if let Some(v) = &overrides.llm_provider {
        config.llm.provider = v.clone();
    }
    if let Some(v) = &overrides.llm_base_url {
        config.llm.base_url = v.clone();
    }
    if let Some(v) = &overrides.llm_api_key {
        config.llm.api_key = v.clone();
    }
    if let Some(v) = &overrides.llm_model {
        config.llm.model = v.clone();
    }
    if let Some(v) = overrides.llm_temperature {
        config.llm.temperature = v;
    }
    if let Some(v) = &overrides.database_url {
        config.database.url = v.clone();
    }
    if let Some(v) = &overrides.billing_backend_url {
        config.billing.backend_url = v.clone();
    }
    if let Some(v) = &overrides.metrics_listen {
        config.metrics.listen = if v == "0" { None } else { Some(v.clone()) };
    }
    if let Some(v) = &overrides.log_level {
        config.logging.level = Some(v.clone());
    }
}
