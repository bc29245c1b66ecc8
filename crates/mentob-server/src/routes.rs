//! Read-only routes: quota, history, shared readings and the tarot catalog.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get};
use mentob_config::LimitsConfig;
use mentob_core::Spread;
use mentob_core::tarot::{MAJOR_ARCANA, builtin_spreads, draw_cards};
use mentob_core::DrawnCard;
use mentob_store::{InterpretationRecord, QuotaSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{ApiError, ApiResponse, success};
use crate::state::AppState;

pub(crate) fn read_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/quota", get(quota))
        .route("/history", get(history))
        .route("/shared/{id}", get(shared))
        .route("/spreads", get(spreads))
        .route("/cards/draw", get(draw))
        .route("/health", get(health))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserQuery {
    #[serde(default)]
    user_id: String,
}

fn require_user(user_id: &str) -> Result<&str, ApiError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(ApiError::invalid("userId is required"));
    }
    Ok(user_id)
}

async fn quota(
    State(state): State<Arc<AppState>>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<ApiResponse<QuotaSnapshot>, ApiError> {
    let Query(query) = query?;
    let session = state.session(require_user(&query.user_id)?);
    Ok(success(state.gate.snapshot(&session).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryQuery {
    #[serde(default)]
    user_id: String,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct HistoryPage {
    interpretations: Vec<InterpretationRecord>,
}

/// Page size for a history request: the default when absent or zero,
/// otherwise clamped to the configured ceiling.
pub(crate) fn history_limit(requested: Option<usize>, limits: &LimitsConfig) -> usize {
    match requested {
        None | Some(0) => limits.history_default,
        Some(n) => n.min(limits.history_max),
    }
}

async fn history(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<ApiResponse<HistoryPage>, ApiError> {
    let Query(query) = query?;
    let user_id = require_user(&query.user_id)?;
    let limit = history_limit(query.limit, &state.limits);
    let interpretations = state.store.list_by_user(user_id, limit).await?;
    Ok(success(HistoryPage { interpretations }))
}

/// Anyone holding the id may read the record.
async fn shared(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<InterpretationRecord>, ApiError> {
    state
        .store
        .get(&id)
        .await?
        .map(success)
        .ok_or_else(|| ApiError::not_found("interpretation not found"))
}

#[derive(Debug, Serialize)]
pub(crate) struct SpreadList {
    spreads: Vec<Spread>,
}

async fn spreads() -> ApiResponse<SpreadList> {
    success(SpreadList {
        spreads: builtin_spreads(),
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct DrawQuery {
    count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Draw {
    cards: Vec<DrawnCard>,
}

async fn draw(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DrawQuery>, QueryRejection>,
) -> Result<ApiResponse<Draw>, ApiError> {
    let Query(query) = query?;
    let count = query.count.unwrap_or(1);
    let max = state.limits.max_cards_per_reading.min(MAJOR_ARCANA.len());
    if count == 0 || count > max {
        return Err(ApiError::invalid(format!("count must be within 1..={max}")));
    }
    Ok(success(Draw {
        cards: draw_cards(count),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_limit_defaults_and_clamps() {
        let limits = LimitsConfig::default();
        assert_eq!(history_limit(None, &limits), 20);
        assert_eq!(history_limit(Some(0), &limits), 20);
        assert_eq!(history_limit(Some(5), &limits), 5);
        assert_eq!(history_limit(Some(500), &limits), 50);
    }

    #[test]
    fn require_user_trims() {
        assert_eq!(require_user(" bob ").unwrap(), "bob");
        assert!(require_user("   ").is_err());
    }
}
