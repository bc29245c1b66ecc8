//! Default value functions for serde deserialization.
//!
//! These functions forward to constants defined in `mentob_core::defaults`.

use mentob_core::defaults;

/// Generate default value functions that forward to mentob_core::defaults constants.
macro_rules! default_fns {
    // For Copy types (integers, bool, etc.)
    ($($fn_name:ident => $const_name:ident : $ty:ty),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> $ty {
                defaults::$const_name
            }
        )*
    };
}

/// Generate default value functions that return String from &str constants.
macro_rules! default_string_fns {
    ($($fn_name:ident => $const_name:ident),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> String {
                defaults::$const_name.to_string()
            }
        )*
    };
}

default_fns! {
    default_shutdown_timeout_secs     => DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64,
    default_free_daily_quota          => DEFAULT_FREE_DAILY_QUOTA: u32,
    default_demo_enabled              => DEFAULT_DEMO_ENABLED: bool,
    default_llm_temperature           => DEFAULT_LLM_TEMPERATURE: f32,
    default_llm_connect_timeout_secs  => DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64,
    default_llm_read_timeout_secs     => DEFAULT_LLM_READ_TIMEOUT_SECS: u64,
    default_followup_timeout_secs     => DEFAULT_FOLLOWUP_TIMEOUT_SECS: u64,
    default_llm_max_event_bytes       => DEFAULT_LLM_MAX_EVENT_BYTES: usize,
    default_db_max_connections        => DEFAULT_DB_MAX_CONNECTIONS: u32,
    default_db_min_connections        => DEFAULT_DB_MIN_CONNECTIONS: u32,
    default_db_connect_timeout_secs   => DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64,
    default_db_auto_migrate           => DEFAULT_DB_AUTO_MIGRATE: bool,
    default_billing_timeout_secs      => DEFAULT_BILLING_TIMEOUT_SECS: u64,
    default_max_question_length       => DEFAULT_MAX_QUESTION_LENGTH: usize,
    default_max_cards_per_reading     => DEFAULT_MAX_CARDS_PER_READING: usize,
    default_max_interpretation_bytes  => DEFAULT_MAX_INTERPRETATION_BYTES: usize,
    default_history_page              => DEFAULT_HISTORY_PAGE: usize,
    default_history_limit             => DEFAULT_HISTORY_LIMIT: usize,
    default_stream_channel_capacity   => DEFAULT_STREAM_CHANNEL_CAPACITY: usize,
}

default_string_fns! {
    default_listen               => DEFAULT_LISTEN,
    default_demo_user_id         => DEFAULT_DEMO_USER_ID,
    default_llm_provider         => DEFAULT_LLM_PROVIDER,
    default_llm_base_url         => DEFAULT_LLM_BASE_URL,
    default_llm_model            => DEFAULT_LLM_MODEL,
    default_system_prompt        => DEFAULT_SYSTEM_PROMPT,
    default_database_url         => DEFAULT_DATABASE_URL,
    default_billing_backend_url  => DEFAULT_BILLING_BACKEND_URL,
    default_checkout_success_url => DEFAULT_CHECKOUT_SUCCESS_URL,
    default_checkout_cancel_url  => DEFAULT_CHECKOUT_CANCEL_URL,
}
