//! Follow-up questions and related-direction suggestions.
//!
//! Neither endpoint touches quota. Follow-ups always answer: if the model
//! fails, times out or returns nothing usable, built-in questions are sent
//! with `isFallback: true`.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::{Json, Router, routing::post};
use mentob_core::DrawnCard;
use mentob_llm::prompt;
use mentob_metrics::record_followup_fallback;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResponse, success};
use crate::state::AppState;

pub(crate) fn followup_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/followup", post(followup))
        .route("/suggest", post(suggest))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Named {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FollowupRequest {
    #[serde(default)]
    question: String,
    #[serde(default)]
    interpretation: String,
    #[serde(default)]
    spread: Option<Named>,
    #[serde(default)]
    cards: Vec<Named>,
    #[serde(default)]
    lang: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Followups {
    questions: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_fallback: bool,
}

async fn followup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FollowupRequest>, JsonRejection>,
) -> Result<ApiResponse<Followups>, ApiError> {
    let Json(req) = payload?;
    if req.question.trim().is_empty() || req.interpretation.trim().is_empty() {
        return Err(ApiError::invalid(
            "question and interpretation are required",
        ));
    }

    let card_names: Vec<&str> = req.cards.iter().map(|c| c.name.as_str()).collect();
    let request = prompt::followup_request(
        &state.system_prompt,
        &req.question,
        &req.interpretation,
        req.spread.as_ref().map(|s| s.name.as_str()),
        &card_names,
        req.lang.as_deref(),
    );

    let generated = match tokio::time::timeout(state.followup_timeout, state.llm.complete(request))
        .await
    {
        Ok(Ok(text)) => Some(prompt::parse_followup_questions(&text)).filter(|q| !q.is_empty()),
        Ok(Err(e)) => {
            warn!(error = %e, "follow-up generation failed");
            None
        }
        Err(_) => {
            warn!(
                timeout_secs = state.followup_timeout.as_secs(),
                "follow-up generation timed out"
            );
            None
        }
    };

    let followups = match generated {
        Some(questions) => {
            debug!(count = questions.len(), "follow-up questions generated");
            Followups {
                questions,
                is_fallback: false,
            }
        }
        None => {
            record_followup_fallback();
            Followups {
                questions: prompt::fallback_followups(req.lang.as_deref()),
                is_fallback: true,
            }
        }
    };
    Ok(success(followups))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuggestRequest {
    #[serde(default)]
    question: String,
    #[serde(default)]
    cards: Option<Vec<DrawnCard>>,
    #[serde(default)]
    interpretation: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct Suggestion {
    suggestion: String,
}

async fn suggest(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SuggestRequest>, JsonRejection>,
) -> Result<ApiResponse<Suggestion>, ApiError> {
    let Json(req) = payload?;
    let Some(cards) = req.cards else {
        return Err(ApiError::invalid("cards are required"));
    };
    if req.question.trim().is_empty() || req.interpretation.trim().is_empty() {
        return Err(ApiError::invalid(
            "question and interpretation are required",
        ));
    }

    let request = prompt::suggestion_request(&req.question, &cards, &req.interpretation);
    let suggestion = state.llm.complete(request).await?;
    Ok(success(Suggestion { suggestion }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn followup_request_is_lenient_about_shapes() {
        let req: FollowupRequest = serde_json::from_str(
            r#"{"question":"q","interpretation":"i","spread":{"name":"Single Card","extra":1},
                "cards":[{"name":"The Fool","id":0}],"lang":"en"}"#,
        )
        .unwrap();
        assert_eq!(req.spread.unwrap().name, "Single Card");
        assert_eq!(req.cards[0].name, "The Fool");
    }

    #[test]
    fn fallback_flag_only_serialized_when_set() {
        let generated = serde_json::to_value(Followups {
            questions: vec!["a".into()],
            is_fallback: false,
        })
        .unwrap();
        assert!(generated.get("isFallback").is_none());

        let fallback = serde_json::to_value(Followups {
            questions: vec![],
            is_fallback: true,
        })
        .unwrap();
        assert_eq!(fallback["isFallback"], true);
    }
}
