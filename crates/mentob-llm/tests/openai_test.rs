//! Integration tests for the OpenAI-compatible client against a local mock
//! provider.
#![allow(clippy::tests_outside_test_module)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use futures_util::StreamExt;
use mentob_llm::{ChatMessage, ChatRequest, LlmClient, LlmError, OpenAiClient, OpenAiConfig};
use parking_lot::Mutex;
use serde_json::Value;

// ============================================================================
// Test Helper: Mock Provider
// ============================================================================

#[derive(Clone, Default)]
struct Captured {
    body: Arc<Mutex<Option<Value>>>,
    auth: Arc<Mutex<Option<String>>>,
}

const SSE_BODY: &str = concat!(
    "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n",
    "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"The Hermit \"}}]}\n\n",
    ": keep-alive\n\n",
    "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"asks you to look inward.\"}}]}\n\n",
    "data: [DONE]\n\n",
);

async fn completions(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    *captured.auth.lock() = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *captured.body.lock() = Some(body);
    ([(header::CONTENT_TYPE, "text/event-stream")], SSE_BODY)
}

async fn truncated() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/event-stream")],
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"The Tower \"}}]}\n\n",
    )
}

async fn oversized() -> impl IntoResponse {
    let body = format!("data: {}\n\ndata: [DONE]\n\n", "x".repeat(4096));
    ([(header::CONTENT_TYPE, "text/event-stream")], body)
}

async fn unauthorized() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": {"message": "Invalid API key", "type": "invalid_request_error"}
        })),
    )
}

async fn start_provider() -> (SocketAddr, Captured) {
    let captured = Captured::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .route("/bad/chat/completions", post(unauthorized))
        .route("/cut/chat/completions", post(truncated))
        .route("/huge/chat/completions", post(oversized))
        .with_state(captured.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, captured)
}

fn client(base_url: String) -> OpenAiClient {
    OpenAiClient::new(OpenAiConfig {
        base_url,
        api_key: "test-key".to_string(),
        model: "tarot-large".to_string(),
        thinking: Some(false),
        ..Default::default()
    })
    .unwrap()
}

fn request() -> ChatRequest {
    ChatRequest::new(vec![
        ChatMessage::system("You read tarot."),
        ChatMessage::user("What should I focus on?"),
    ])
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_streams_fragments_in_order() {
    let (addr, captured) = start_provider().await;
    let client = client(format!("http://{addr}/v1"));

    let mut stream = client.stream(request()).await.unwrap();
    let mut fragments = Vec::new();
    while let Some(chunk) = stream.next().await {
        fragments.push(chunk.unwrap());
    }
    assert_eq!(fragments, ["The Hermit ", "asks you to look inward."]);

    let body = captured.body.lock().clone().unwrap();
    assert_eq!(body["model"], "tarot-large");
    assert_eq!(body["stream"], true);
    assert_eq!(body["messages"][1]["content"], "What should I focus on?");
    assert_eq!(body["thinking"]["type"], "disabled");
    assert_eq!(captured.auth.lock().as_deref(), Some("Bearer test-key"));
}

#[tokio::test]
async fn test_complete_collects_stream() {
    let (addr, _) = start_provider().await;
    let client = client(format!("http://{addr}/v1"));

    let text = client.complete(request().temperature(0.2)).await.unwrap();
    assert_eq!(text, "The Hermit asks you to look inward.");
}

#[tokio::test]
async fn test_error_status_surfaces_provider_message() {
    let (addr, _) = start_provider().await;
    let client = client(format!("http://{addr}/bad"));

    match client.stream(request()).await {
        Err(LlmError::Status { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API key");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected an error"),
    }
}

#[tokio::test]
async fn test_unreachable_provider_is_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(format!("http://{addr}/v1"));
    assert!(matches!(
        client.stream(request()).await,
        Err(LlmError::Transport(_))
    ));
}

#[tokio::test]
async fn test_stream_cut_before_done_is_decode_error() {
    let (addr, _) = start_provider().await;
    let client = client(format!("http://{addr}/cut"));

    let results: Vec<_> = client.stream(request()).await.unwrap().collect().await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_deref().unwrap(), "The Tower ");
    assert!(matches!(&results[1], Err(LlmError::Decode(_))));

    assert!(matches!(
        client.complete(request()).await,
        Err(LlmError::Decode(_))
    ));
}

#[tokio::test]
async fn test_line_over_event_limit_is_decode_error() {
    let (addr, _) = start_provider().await;
    let client = OpenAiClient::new(OpenAiConfig {
        base_url: format!("http://{addr}/huge"),
        max_event_bytes: 1024,
        ..Default::default()
    })
    .unwrap();

    let results: Vec<_> = client.stream(request()).await.unwrap().collect().await;
    assert_eq!(results.len(), 1);
    match &results[0] {
        Err(LlmError::Decode(message)) => assert!(message.contains("1024 bytes")),
        other => panic!("unexpected result: {other:?}"),
    }
}
