//! Configuration validation.

use std::net::SocketAddr;

use crate::Config;
use crate::loader::ConfigError;

const PROVIDERS: &[&str] = &["openai", "scripted"];
const LOG_FORMATS: &[&str] = &["json", "pretty", "compact"];
const LOG_OUTPUTS: &[&str] = &["stdout", "stderr"];

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.listen.trim().is_empty() {
        return Err(invalid("server.listen is empty"));
    }
    if config.server.listen.parse::<SocketAddr>().is_err() {
        return Err(invalid(format!(
            "server.listen is not a socket address: {}",
            config.server.listen
        )));
    }
    if config.quota.free_daily == 0 {
        return Err(invalid("quota.free_daily must be > 0"));
    }
    if config.demo.enabled && config.demo.user_id.trim().is_empty() {
        return Err(invalid("demo.user_id is empty"));
    }

    validate_llm(config)?;

    if config.database.url.trim().is_empty() {
        return Err(invalid("database.url is empty"));
    }
    if config.database.max_connections == 0 {
        return Err(invalid("database.max_connections must be > 0"));
    }
    if config.database.min_connections > config.database.max_connections {
        return Err(invalid(
            "database.min_connections must be <= database.max_connections",
        ));
    }
    if config.billing.backend_url.trim().is_empty() {
        return Err(invalid("billing.backend_url is empty"));
    }
    if config.billing.timeout_secs == 0 {
        return Err(invalid("billing.timeout_secs must be > 0"));
    }

    validate_limits(config)?;

    if let Some(listen) = &config.metrics.listen
        && listen.parse::<SocketAddr>().is_err()
    {
        return Err(invalid(format!(
            "metrics.listen is not a socket address: {listen}"
        )));
    }
    if let Some(format) = &config.logging.format
        && !LOG_FORMATS.contains(&format.as_str())
    {
        return Err(invalid(format!(
            "logging.format must be one of {LOG_FORMATS:?}, got {format}"
        )));
    }
    if let Some(output) = &config.logging.output
        && !LOG_OUTPUTS.contains(&output.as_str())
    {
        return Err(invalid(format!(
            "logging.output must be one of {LOG_OUTPUTS:?}, got {output}"
        )));
    }
    Ok(())
}

fn validate_llm(config: &Config) -> Result<(), ConfigError> {
    let llm = &config.llm;
    if !PROVIDERS.contains(&llm.provider.as_str()) {
        return Err(invalid(format!(
            "llm.provider must be one of {PROVIDERS:?}, got {}",
            llm.provider
        )));
    }
    if llm.provider == "openai" && llm.base_url.trim().is_empty() {
        return Err(invalid("llm.base_url is empty"));
    }
    if llm.provider == "openai" && llm.model.trim().is_empty() {
        return Err(invalid("llm.model is empty"));
    }
    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(invalid(format!(
            "llm.temperature must be within 0.0..=2.0, got {}",
            llm.temperature
        )));
    }
    if llm.max_tokens == Some(0) {
        return Err(invalid("llm.max_tokens must be > 0"));
    }
    if llm.connect_timeout_secs == 0 {
        return Err(invalid("llm.connect_timeout_secs must be > 0"));
    }
    if llm.read_timeout_secs == 0 {
        return Err(invalid("llm.read_timeout_secs must be > 0"));
    }
    if llm.followup_timeout_secs == 0 {
        return Err(invalid("llm.followup_timeout_secs must be > 0"));
    }
    if llm.max_event_bytes == 0 {
        return Err(invalid("llm.max_event_bytes must be > 0"));
    }
    if llm.system_prompt.trim().is_empty() {
        return Err(invalid("llm.system_prompt is empty"));
    }
    Ok(())
}

fn validate_limits(config: &Config) -> Result<(), ConfigError> {
    let limits = &config.limits;
    let positive = [
        ("limits.max_question_length", limits.max_question_length),
        ("limits.max_cards_per_reading", limits.max_cards_per_reading),
        ("limits.max_interpretation_bytes", limits.max_interpretation_bytes),
        ("limits.history_default", limits.history_default),
        ("limits.history_max", limits.history_max),
        ("limits.stream_channel_capacity", limits.stream_channel_capacity),
    ];
    for (name, value) in positive {
        if value == 0 {
            return Err(invalid(format!("{name} must be > 0")));
        }
    }
    if limits.history_default > limits.history_max {
        return Err(invalid(
            "limits.history_default must be <= limits.history_max",
        ));
    }
    Ok(())
}
