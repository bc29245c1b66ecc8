//! Streaming interpretation handler.
//!
//! A reading moves through
//! `Validated -> QuotaChecked -> Streaming -> Completed -> Persisted -> QuotaConsumed`
//! and may end in `Failed` from any step between the quota check and the
//! write. Only a completed reading is stored, and quota is charged only after
//! the store accepted it.
//!
//! The LLM stream is consumed by a spawned task that forwards each fragment
//! through a bounded channel to the response body. A closed channel means
//! the client went away; the task then drops the upstream stream and stops.

use std::io;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::stream::{self, Stream};
use futures_util::StreamExt;
use mentob_config::LimitsConfig;
use mentob_core::{DrawnCard, ERROR_DISCONNECT, ERROR_LLM, ERROR_OVERFLOW, ERROR_STORE, Spread};
use mentob_llm::{ChunkStream, LlmError, prompt};
use mentob_metrics::{
    record_interpretation_completed, record_interpretation_failed, record_interpretation_started,
    record_llm_fragment, record_quota_consumed, record_quota_rejected,
};
use mentob_store::{NewInterpretation, Session, StoreError};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ErrorCode};
use crate::state::AppState;

type BodyItem = Result<Bytes, io::Error>;

/// A spread given either by catalog id or in full.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SpreadInput {
    Id(String),
    Full(Spread),
}

impl SpreadInput {
    /// Resolve to a spread with positions, filling from the catalog by id
    /// when the client sent none.
    pub fn resolve(self) -> Option<Spread> {
        match self {
            Self::Id(id) => Spread {
                id,
                name: String::new(),
                description: String::new(),
                positions: Vec::new(),
            }
            .resolve(),
            Self::Full(spread) => spread.resolve(),
        }
    }
}

/// Body of `POST /interpret`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpretRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub spread: Option<SpreadInput>,
    #[serde(default)]
    pub cards: Vec<DrawnCard>,
    /// Reply language, e.g. "en" or "zh".
    #[serde(default)]
    pub lang: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone)]
pub struct Reading {
    pub user_id: String,
    pub question: String,
    pub spread: Spread,
    pub cards: Vec<DrawnCard>,
    pub lang: Option<String>,
}

impl InterpretRequest {
    /// Check the request before any quota lookup or LLM call.
    pub fn validate(self, limits: &LimitsConfig) -> Result<Reading, ApiError> {
        let user_id = self.user_id.trim();
        if user_id.is_empty() {
            return Err(ApiError::invalid("userId is required"));
        }
        let question = self.question.trim();
        if question.is_empty() {
            return Err(ApiError::invalid("question is required"));
        }
        if question.chars().count() > limits.max_question_length {
            return Err(ApiError::invalid(format!(
                "question is longer than {} characters",
                limits.max_question_length
            )));
        }
        let Some(spread) = self.spread else {
            return Err(ApiError::invalid("spread is required"));
        };
        if self.cards.is_empty() {
            return Err(ApiError::invalid("cards are required"));
        }
        if self.cards.len() > limits.max_cards_per_reading {
            return Err(ApiError::new(
                ErrorCode::InvalidCards,
                format!(
                    "at most {} cards may be drawn per reading",
                    limits.max_cards_per_reading
                ),
            ));
        }
        let spread = spread
            .resolve()
            .ok_or_else(|| ApiError::new(ErrorCode::InvalidSpread, "unknown spread"))?;
        if self.cards.len() != spread.positions.len() {
            return Err(ApiError::new(
                ErrorCode::InvalidCards,
                format!(
                    "spread {} takes {} cards, got {}",
                    spread.id,
                    spread.positions.len(),
                    self.cards.len()
                ),
            ));
        }

        Ok(Reading {
            user_id: user_id.to_string(),
            question: question.to_string(),
            spread,
            cards: self.cards,
            lang: self.lang.filter(|l| !l.is_empty()),
        })
    }
}

/// Lifecycle of one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Validated,
    QuotaChecked,
    Streaming,
    Completed,
    Persisted,
    QuotaConsumed,
    Failed,
}

impl Phase {
    /// Whether `self -> next` is a legal step.
    pub fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Validated, QuotaChecked)
                | (QuotaChecked, Streaming)
                | (Streaming, Completed)
                | (Completed, Persisted)
                | (Persisted, QuotaConsumed)
                | (QuotaChecked | Streaming | Completed, Failed)
        )
    }
}

/// Why a reading ended without a record.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    #[error("llm stream failed: {0}")]
    Llm(#[from] LlmError),
    #[error("interpretation exceeded {limit} bytes")]
    Overflow { limit: usize },
    #[error("client disconnected")]
    Disconnected,
    #[error("storing the reading failed: {0}")]
    Store(#[from] StoreError),
}

impl Failure {
    /// Error type string for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Failure::Llm(_) => ERROR_LLM,
            Failure::Overflow { .. } => ERROR_OVERFLOW,
            Failure::Disconnected => ERROR_DISCONNECT,
            Failure::Store(_) => ERROR_STORE,
        }
    }
}

/// Phase tracking plus the bounded text buffer.
#[derive(Debug)]
pub struct ReadingRun {
    phase: Phase,
    text: String,
    max_bytes: usize,
    started: Instant,
}

impl ReadingRun {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            phase: Phase::Validated,
            text: String::new(),
            max_bytes,
            started: Instant::now(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn advance(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal reading transition {:?} -> {:?}",
            self.phase,
            next
        );
        debug!(from = ?self.phase, to = ?next, "reading phase");
        self.phase = next;
    }

    /// Append a fragment, failing once the buffer would exceed its cap.
    pub fn push(&mut self, fragment: &str) -> Result<(), Failure> {
        if self.text.len() + fragment.len() > self.max_bytes {
            return Err(Failure::Overflow {
                limit: self.max_bytes,
            });
        }
        self.text.push_str(fragment);
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Drop whatever was accumulated.
    pub fn discard(&mut self) {
        self.text = String::new();
    }
}

/// `POST /interpret`
pub(crate) async fn interpret(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InterpretRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let reading = request.validate(&state.limits)?;
    let session = state.session(&reading.user_id);
    let mut run = ReadingRun::new(state.limits.max_interpretation_bytes);

    if !state.gate.can_interpret(&session).await? {
        record_quota_rejected();
        info!(user_id = %session.user_id, "daily quota exhausted");
        return Err(ApiError::new(
            ErrorCode::QuotaExceeded,
            "today's readings are used up, please come back tomorrow",
        ));
    }
    run.advance(Phase::QuotaChecked);

    let request = prompt::interpretation_request(
        &state.system_prompt,
        &reading.question,
        &reading.spread,
        &reading.cards,
        reading.lang.as_deref(),
    );
    let fragments = match state.llm.stream(request).await {
        Ok(fragments) => fragments,
        Err(e) => {
            run.advance(Phase::Failed);
            return Err(e.into());
        }
    };

    run.advance(Phase::Streaming);
    record_interpretation_started();
    debug!(
        user_id = %session.user_id,
        spread = %reading.spread.id,
        cards = reading.cards.len(),
        backend = state.llm.name(),
        "reading started"
    );

    let (tx, rx) = mpsc::channel(state.limits.stream_channel_capacity);
    tokio::spawn(drive(state.clone(), session, reading, run, fragments, tx));

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(receiver_stream(rx)),
    )
        .into_response())
}

fn receiver_stream(rx: mpsc::Receiver<BodyItem>) -> impl Stream<Item = BodyItem> + Send + 'static {
    stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) })
}

/// Run a reading from its first fragment to a terminal phase.
///
/// `tx` is held until the record is written and charged, so the response
/// body only ends after the reading is durable.
async fn drive(
    state: Arc<AppState>,
    session: Session,
    reading: Reading,
    mut run: ReadingRun,
    fragments: ChunkStream,
    tx: mpsc::Sender<BodyItem>,
) {
    let result = match forward(&mut run, fragments, &tx).await {
        Ok(()) => {
            run.advance(Phase::Completed);
            persist(&state, &session, reading, &mut run).await
        }
        Err(failure) => Err(failure),
    };

    if let Err(failure) = result {
        let at = run.phase();
        run.advance(Phase::Failed);
        run.discard();
        warn!(user_id = %session.user_id, phase = ?at, error = %failure, "reading failed");
        record_interpretation_failed(failure.kind());
        // Abort the body so the client sees a broken response, not a short reading.
        let _ = tx.send(Err(io::Error::other(failure.to_string()))).await;
    }
}

/// Forward fragments to the client until the LLM stream ends.
async fn forward(
    run: &mut ReadingRun,
    mut fragments: ChunkStream,
    tx: &mpsc::Sender<BodyItem>,
) -> Result<(), Failure> {
    loop {
        let next = tokio::select! {
            biased;
            _ = tx.closed() => return Err(Failure::Disconnected),
            next = fragments.next() => next,
        };
        match next {
            None => return Ok(()),
            Some(Err(e)) => return Err(e.into()),
            Some(Ok(text)) => {
                record_llm_fragment();
                run.push(&text)?;
                if tx.send(Ok(Bytes::from(text))).await.is_err() {
                    return Err(Failure::Disconnected);
                }
            }
        }
    }
}

/// Write the record, then charge one unit of quota.
async fn persist(
    state: &AppState,
    session: &Session,
    reading: Reading,
    run: &mut ReadingRun,
) -> Result<(), Failure> {
    let bytes = run.text().len();
    let record = state
        .store
        .create(NewInterpretation {
            user_id: session.user_id.clone(),
            question: reading.question,
            spread_type: reading.spread.id,
            cards: reading.cards,
            interpretation: run.text().to_string(),
        })
        .await?;
    run.advance(Phase::Persisted);

    // The reading is already stored; a failed charge is logged and forgiven.
    match state.gate.use_quota(session).await {
        Ok(used) if used.success => {
            run.advance(Phase::QuotaConsumed);
            if !session.policy.is_unlimited() {
                record_quota_consumed();
            }
            debug!(user_id = %session.user_id, remaining = used.remaining, "quota charged");
        }
        Ok(_) => warn!(
            reading_id = %record.id,
            user_id = %session.user_id,
            "quota exhausted before the reading was charged"
        ),
        Err(e) => warn!(
            reading_id = %record.id,
            user_id = %session.user_id,
            error = %e,
            "failed to charge quota for a stored reading"
        ),
    }

    let elapsed = run.started.elapsed();
    info!(
        reading_id = %record.id,
        user_id = %session.user_id,
        bytes,
        elapsed_ms = elapsed.as_millis() as u64,
        "reading completed"
    );
    record_interpretation_completed(elapsed.as_secs_f64(), bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use mentob_core::tarot::{MAJOR_ARCANA, find_spread};

    use super::*;

    fn cards(n: usize) -> Vec<DrawnCard> {
        MAJOR_ARCANA[..n]
            .iter()
            .map(|c| DrawnCard::from_card(c, false))
            .collect()
    }

    fn request(spread: Option<SpreadInput>, n: usize) -> InterpretRequest {
        InterpretRequest {
            user_id: "alice".into(),
            question: "Should I change jobs?".into(),
            spread,
            cards: cards(n),
            lang: None,
        }
    }

    fn code(result: Result<Reading, ApiError>) -> ErrorCode {
        match result {
            Err(e) => e.code,
            Ok(r) => panic!("expected rejection, got {r:?}"),
        }
    }

    #[test]
    fn spread_id_resolves_from_catalog() {
        let reading = request(Some(SpreadInput::Id("three".into())), 3)
            .validate(&LimitsConfig::default())
            .unwrap();
        assert_eq!(reading.spread.positions.len(), 3);
        assert_eq!(reading.spread.name, "Three Card Spread");
    }

    #[test]
    fn full_spread_is_kept() {
        let mut spread = find_spread("single").unwrap();
        spread.name = "My Card".into();
        let reading = request(Some(SpreadInput::Full(spread)), 1)
            .validate(&LimitsConfig::default())
            .unwrap();
        assert_eq!(reading.spread.name, "My Card");
    }

    #[test]
    fn spread_accepts_string_or_object() {
        let by_id: InterpretRequest =
            serde_json::from_str(r#"{"userId":"u","question":"q","spread":"single","cards":[]}"#)
                .unwrap();
        assert!(matches!(by_id.spread, Some(SpreadInput::Id(ref id)) if id == "single"));
        let full: InterpretRequest =
            serde_json::from_str(r#"{"userId":"u","question":"q","spread":{"id":"cross"},"cards":[]}"#)
                .unwrap();
        assert!(matches!(full.spread, Some(SpreadInput::Full(_))));
    }

    #[test]
    fn missing_fields_are_invalid_request() {
        let limits = LimitsConfig::default();
        let mut r = request(Some(SpreadInput::Id("single".into())), 1);
        r.user_id = "  ".into();
        assert_eq!(code(r.validate(&limits)), ErrorCode::InvalidRequest);

        let mut r = request(Some(SpreadInput::Id("single".into())), 1);
        r.question.clear();
        assert_eq!(code(r.validate(&limits)), ErrorCode::InvalidRequest);

        assert_eq!(code(request(None, 1).validate(&limits)), ErrorCode::InvalidRequest);
        assert_eq!(
            code(request(Some(SpreadInput::Id("single".into())), 0).validate(&limits)),
            ErrorCode::InvalidRequest
        );
    }

    #[test]
    fn long_question_is_rejected() {
        let mut r = request(Some(SpreadInput::Id("single".into())), 1);
        r.question = "?".repeat(501);
        assert_eq!(code(r.validate(&LimitsConfig::default())), ErrorCode::InvalidRequest);
    }

    #[test]
    fn unknown_spread_is_rejected() {
        let r = request(Some(SpreadInput::Id("pentagram".into())), 1);
        assert_eq!(code(r.validate(&LimitsConfig::default())), ErrorCode::InvalidSpread);
    }

    #[test]
    fn card_count_must_match_positions() {
        let r = request(Some(SpreadInput::Id("three".into())), 2);
        assert_eq!(code(r.validate(&LimitsConfig::default())), ErrorCode::InvalidCards);
    }

    #[test]
    fn too_many_cards_is_rejected() {
        let limits = LimitsConfig {
            max_cards_per_reading: 2,
            ..Default::default()
        };
        let r = request(Some(SpreadInput::Id("three".into())), 3);
        assert_eq!(code(r.validate(&limits)), ErrorCode::InvalidCards);
    }

    #[test]
    fn phase_transitions() {
        use Phase::*;
        assert!(Validated.can_advance_to(QuotaChecked));
        assert!(Streaming.can_advance_to(Failed));
        assert!(Completed.can_advance_to(Failed));
        assert!(!Validated.can_advance_to(Streaming));
        assert!(!Persisted.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(Persisted));
    }

    #[test]
    fn buffer_cap_fails_the_reading() {
        let mut run = ReadingRun::new(8);
        run.push("The ").unwrap();
        run.push("Sun").unwrap();
        assert!(matches!(run.push("rise"), Err(Failure::Overflow { limit: 8 })));
        assert_eq!(run.text(), "The Sun");
        run.discard();
        assert!(run.text().is_empty());
    }

    #[test]
    fn buffer_accepts_exactly_the_cap() {
        let mut run = ReadingRun::new(4);
        run.push("four").unwrap();
        assert_eq!(run.phase(), Phase::Validated);
    }

    #[test]
    fn failure_kinds() {
        assert_eq!(Failure::Disconnected.kind(), ERROR_DISCONNECT);
        assert_eq!(Failure::Overflow { limit: 1 }.kind(), ERROR_OVERFLOW);
        assert_eq!(Failure::Llm(LlmError::Timeout).kind(), ERROR_LLM);
    }
}
