//! CLI module for mentob-server.
//!
//! This module provides the command-line interface that can be used either
//! as a standalone binary or as a subcommand of the main mentob CLI.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use mentob_config::{
    CliOverrides, Config, LoggingConfig, apply_overrides, load_config, validate_config,
};
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{CancellationToken, run_with_shutdown};

/// Mentob server CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "mentob-server", version, about = "AI tarot reading service")]
pub struct ServerArgs {
    /// Config file path (json/jsonc/yaml/toml); built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: CliOverrides,
}

/// Load, override and validate the configuration.
pub fn resolve_config(args: &ServerArgs) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &args.overrides);
    validate_config(&config)?;
    Ok(config)
}

/// Run the mentob server with the given arguments.
///
/// This is the main entry point for the server CLI, used by both the
/// standalone binary and the unified mentob CLI.
pub async fn run(args: ServerArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&args)?;

    init_tracing(&config.logging);
    match &args.config {
        Some(path) => info!(path = %path.display(), "configuration loaded"),
        None => info!("no config file given, using defaults"),
    }

    if let Some(listen) = &config.metrics.listen {
        match mentob_metrics::init_prometheus(listen) {
            Ok(()) => info!(address = %listen, "prometheus exporter started"),
            Err(e) => warn!(error = %e, "prometheus exporter not started"),
        }
    }

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal_handler().await;
            shutdown.cancel();
        }
    });

    run_with_shutdown(config, shutdown).await?;
    Ok(())
}

/// Resolve once SIGINT or SIGTERM arrives.
async fn shutdown_signal_handler() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {}
        _ = terminate => {}
    }
}

/// Base level plus `module=level` directives from `logging.filters`.
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    let mut directives = vec![
        config
            .level
            .as_deref()
            .unwrap_or(mentob_core::DEFAULT_LOG_LEVEL)
            .to_string(),
    ];
    directives.extend(
        config
            .filters
            .iter()
            .map(|(module, level)| format!("{module}={level}")),
    );

    EnvFilter::try_new(directives.join(",")).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber described by `logging`.
///
/// `format` is one of json, pretty or compact (default pretty); `output` is
/// stdout or stderr (default stderr).
fn init_tracing(config: &LoggingConfig) {
    let writer = match config.output.as_deref() {
        Some("stdout") => BoxMakeWriter::new(io::stdout),
        _ => BoxMakeWriter::new(io::stderr),
    };
    let registry = tracing_subscriber::registry().with(env_filter(config));

    let result = match config.format.as_deref().unwrap_or(mentob_core::DEFAULT_LOG_FORMAT) {
        "json" => registry.with(fmt::layer().json().with_writer(writer)).try_init(),
        "compact" => registry.with(fmt::layer().compact().with_writer(writer)).try_init(),
        _ => registry.with(fmt::layer().with_writer(writer)).try_init(),
    };
    // Already set when embedded in another process that owns logging.
    if let Err(e) = result {
        eprintln!("tracing already initialized: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_config_file() {
        let args = ServerArgs::parse_from(["mentob-server", "--listen", "127.0.0.1:0"]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:0");
        assert_eq!(config.quota.free_daily, 3);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let args = ServerArgs::parse_from(["mentob-server", "--llm-temperature", "3.5"]);
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let args = ServerArgs::parse_from(["mentob-server", "-c", "/nonexistent/mentob.toml"]);
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn filter_includes_module_overrides() {
        let mut config = LoggingConfig::default();
        config.filters.insert("sqlx".into(), "warn".into());
        let filter = env_filter(&config).to_string();
        assert!(filter.contains("sqlx=warn"));
    }
}
