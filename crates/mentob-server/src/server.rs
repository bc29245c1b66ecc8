//! Router assembly, backend construction and the serve loop.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use mentob_config::{Config, DatabaseConfig, LlmConfig};
use mentob_llm::{LlmClient, OpenAiClient, OpenAiConfig, ScriptedClient};
use mentob_metrics::record_http_request;
use mentob_store::sql::{SqlStore, SqlStoreConfig};
use mentob_store::{MemoryStore, Store};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::billing::billing_routes;
use crate::error::ServerError;
use crate::followup::followup_routes;
use crate::interpret::interpret;
use crate::routes::read_routes;
use crate::state::AppState;

/// Default graceful shutdown timeout.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration =
    Duration::from_secs(mentob_core::DEFAULT_SHUTDOWN_TIMEOUT_SECS);

/// Build the HTTP router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/interpret", post(interpret))
        .merge(read_routes())
        .merge(followup_routes())
        .merge(billing_routes())
        .layer(middleware::from_fn(track_requests))
        .with_state(state)
}

async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned());
    let response = next.run(request).await;
    record_http_request(
        route.as_deref().unwrap_or("unmatched"),
        response.status().as_u16(),
    );
    response
}

/// Open the configured store: the process-local one for `memory`, SQL otherwise.
pub async fn build_store(config: &DatabaseConfig) -> Result<Arc<dyn Store>, ServerError> {
    if config.is_memory() {
        info!("using in-memory store; readings are lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store = SqlStore::connect(
        SqlStoreConfig::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .auto_migrate(config.auto_migrate),
    )
    .await?;
    Ok(Arc::new(store))
}

/// Create the configured LLM client.
pub fn build_llm(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, ServerError> {
    match config.provider.as_str() {
        "openai" => {
            if config.api_key.is_empty() {
                warn!(base_url = %config.base_url, "no LLM api key configured");
            }
            let client = OpenAiClient::new(OpenAiConfig {
                base_url: config.base_url.clone(),
                api_key: config.api_key.clone(),
                model: config.model.clone(),
                temperature: config.temperature,
                max_tokens: config.max_tokens,
                thinking: config.thinking,
                connect_timeout: Duration::from_secs(config.connect_timeout_secs),
                read_timeout: Duration::from_secs(config.read_timeout_secs),
                max_event_bytes: config.max_event_bytes,
            })?;
            info!(model = %config.model, base_url = %config.base_url, "LLM backend: openai");
            Ok(Arc::new(client))
        }
        "scripted" => {
            info!(chunks = config.scripted_chunks.len(), "LLM backend: scripted");
            Ok(Arc::new(ScriptedClient::new(config.scripted_chunks.clone())))
        }
        other => Err(ServerError::Config(format!("unknown llm provider: {other}"))),
    }
}

/// Serve on an already bound listener until `shutdown` fires.
///
/// In-flight requests get `grace` to finish; streams still open after that
/// are dropped.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: CancellationToken,
    grace: Duration,
) -> Result<(), ServerError> {
    let app = router(state);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        _ = shutdown.cancelled() => {
            info!("shutdown signal received, draining connections");
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!(grace_secs = grace.as_secs(), "shutdown timeout, dropping open connections"),
            }
        }
    }
    info!("server stopped");
    Ok(())
}

/// Run the server with a cancellation token for graceful shutdown.
pub async fn run_with_shutdown(config: Config, shutdown: CancellationToken) -> Result<(), ServerError> {
    let store = build_store(&config.database).await?;
    let llm = build_llm(&config.llm)?;
    let state = Arc::new(AppState::new(&config, store, llm)?);

    let listener = TcpListener::bind(config.server.listen.as_str()).await?;
    info!(
        address = %listener.local_addr()?,
        free_daily_quota = config.quota.free_daily,
        demo = config.demo.enabled,
        "listening"
    );

    serve(
        listener,
        state,
        shutdown,
        Duration::from_secs(config.server.shutdown_timeout_secs),
    )
    .await
}

/// Run the server until the process is killed.
pub async fn run(config: Config) -> Result<(), ServerError> {
    run_with_shutdown(config, CancellationToken::new()).await
}
