use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use clap::Parser;

use super::*;

static SEQ: AtomicUsize = AtomicUsize::new(0);

/// Write `contents` to a fresh file in the temp dir with the given extension.
fn write_temp(ext: &str, contents: &str) -> PathBuf {
    let n = SEQ.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "mentob-config-{}-{n}.{ext}",
        std::process::id()
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn defaults_are_valid() {
    let config = Config::default();
    validate_config(&config).unwrap();
    assert_eq!(config.quota.free_daily, 3);
    assert_eq!(config.demo.account(), Some("demo-user-id"));
    assert_eq!(config.llm.provider, "openai");
    assert_eq!(config.limits.history_max, 50);
}

#[test]
fn load_toml_with_partial_sections() {
    let path = write_temp(
        "toml",
        r#"
[server]
listen = "0.0.0.0:8080"

[quota]
free_daily = 5

[llm]
provider = "scripted"
scripted_chunks = ["The Sun ", "shines."]

[logging.filters]
sqlx = "warn"
"#,
    );
    let config = load_config(&path).unwrap();
    assert_eq!(config.server.listen, "0.0.0.0:8080");
    assert_eq!(config.server.shutdown_timeout_secs, 30);
    assert_eq!(config.quota.free_daily, 5);
    assert_eq!(config.llm.scripted_chunks.len(), 2);
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.logging.filters.get("sqlx").map(String::as_str), Some("warn"));
    validate_config(&config).unwrap();
    let _ = std::fs::remove_file(path);
}

#[test]
fn load_jsonc_strips_comments() {
    let path = write_temp(
        "jsonc",
        r#"{
  // local development
  "database": { "url": "memory" },
  "demo": { "enabled": false }
}"#,
    );
    let config = load_config(&path).unwrap();
    assert!(config.database.is_memory());
    assert_eq!(config.demo.account(), None);
    let _ = std::fs::remove_file(path);
}

#[test]
fn load_yaml() {
    let path = write_temp("yaml", "limits:\n  history_default: 10\n  history_max: 25\n");
    let config = load_config(&path).unwrap();
    assert_eq!(config.limits.history_default, 10);
    assert_eq!(config.limits.history_max, 25);
    let _ = std::fs::remove_file(path);
}

#[test]
fn unknown_extension_is_rejected() {
    let path = write_temp("ini", "listen=1");
    match load_config(&path) {
        Err(ConfigError::UnsupportedFormat(ext)) => assert_eq!(ext, "ini"),
        other => panic!("expected unsupported format, got {other:?}"),
    }
    let _ = std::fs::remove_file(path);
}

#[test]
fn missing_file_is_io_error() {
    let path = std::env::temp_dir().join("mentob-config-does-not-exist.toml");
    assert!(matches!(load_config(path), Err(ConfigError::Io(_))));
}

#[test]
fn format_from_extension_ignores_case() {
    use std::path::Path;
    assert_eq!(
        ConfigFormat::from_path(Path::new("mentob.YML")).unwrap(),
        ConfigFormat::Yaml
    );
    assert_eq!(
        ConfigFormat::from_path(Path::new("mentob.jsonc")).unwrap(),
        ConfigFormat::Json
    );
    assert!(ConfigFormat::from_path(Path::new("mentob")).is_err());
}

#[test]
fn empty_documents_yield_defaults() {
    for format in [ConfigFormat::Yaml, ConfigFormat::Toml] {
        let config = parse_config("", format).unwrap();
        assert_eq!(config.quota.free_daily, 3);
    }
    let config = parse_config("{ /* nothing */ }", ConfigFormat::Json).unwrap();
    assert_eq!(config.server.listen, "127.0.0.1:5000");
}

#[test]
fn overrides_replace_file_values() {
    let mut config = Config::default();
    let overrides = CliOverrides::parse_from([
        "mentob",
        "--listen",
        "0.0.0.0:9000",
        "--free-daily-quota",
        "7",
        "--demo-enabled",
        "false",
        "--llm-provider",
        "scripted",
        "--llm-api-key",
        "sk-test",
        "--database-url",
        "memory",
        "--metrics-listen",
        "127.0.0.1:9100",
    ]);
    apply_overrides(&mut config, &overrides);

    assert_eq!(config.server.listen, "0.0.0.0:9000");
    assert_eq!(config.quota.free_daily, 7);
    assert!(!config.demo.enabled);
    assert_eq!(config.llm.provider, "scripted");
    assert_eq!(config.llm.api_key, "sk-test");
    assert!(config.database.is_memory());
    assert_eq!(config.metrics.listen.as_deref(), Some("127.0.0.1:9100"));
    validate_config(&config).unwrap();
}

#[test]
fn metrics_listen_zero_disables_exporter() {
    let mut config = Config::default();
    config.metrics.listen = Some("127.0.0.1:9100".into());
    let overrides = CliOverrides {
        metrics_listen: Some("0".into()),
        ..Default::default()
    };
    apply_overrides(&mut config, &overrides);
    assert_eq!(config.metrics.listen, None);
}

fn validation_message(config: &Config) -> String {
    match validate_config(config) {
        Err(ConfigError::Validation(msg)) => msg,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn rejects_bad_listen() {
    let mut config = Config::default();
    config.server.listen = "nowhere".into();
    assert!(validation_message(&config).starts_with("server.listen"));
}

#[test]
fn rejects_unknown_provider() {
    let mut config = Config::default();
    config.llm.provider = "oracle".into();
    assert!(validation_message(&config).starts_with("llm.provider"));
}

#[test]
fn rejects_out_of_range_temperature() {
    let mut config = Config::default();
    config.llm.temperature = 2.5;
    assert!(validation_message(&config).starts_with("llm.temperature"));
}

#[test]
fn rejects_zero_limits() {
    let mut config = Config::default();
    config.limits.max_interpretation_bytes = 0;
    assert_eq!(
        validation_message(&config),
        "limits.max_interpretation_bytes must be > 0"
    );
}

#[test]
fn rejects_zero_event_line_limit() {
    let mut config = Config::default();
    config.llm.max_event_bytes = 0;
    assert_eq!(
        validation_message(&config),
        "llm.max_event_bytes must be > 0"
    );
}

#[test]
fn rejects_history_default_above_max() {
    let mut config = Config::default();
    config.limits.history_default = 100;
    assert!(validation_message(&config).starts_with("limits.history_default"));
}

#[test]
fn disabled_demo_may_have_empty_id() {
    let mut config = Config::default();
    config.demo.enabled = false;
    config.demo.user_id.clear();
    validate_config(&config).unwrap();
}

#[test]
fn rejects_unknown_log_format() {
    let mut config = Config::default();
    config.logging.format = Some("xml".into());
    assert!(validation_message(&config).starts_with("logging.format"));
}
