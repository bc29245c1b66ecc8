//! OpenAI-compatible streaming client.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use mentob_core::{
    DEFAULT_LLM_BASE_URL, DEFAULT_LLM_CONNECT_TIMEOUT_SECS, DEFAULT_LLM_MAX_EVENT_BYTES,
    DEFAULT_LLM_MODEL, DEFAULT_LLM_READ_TIMEOUT_SECS, DEFAULT_LLM_TEMPERATURE,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::sse::{SseDecoder, SseEvent, parse_delta};
use crate::traits::{ChunkStream, LlmClient};
use crate::types::{ChatMessage, ChatRequest};

/// Configuration for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API base URL, without the `/chat/completions` suffix.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Provider-side reasoning toggle; omitted from the request when `None`.
    pub thinking: Option<bool>,
    pub connect_timeout: Duration,
    /// Maximum silence between two body reads.
    pub read_timeout: Duration,
    /// Longest raw SSE line accepted before the stream is failed.
    pub max_event_bytes: usize,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: DEFAULT_LLM_TEMPERATURE,
            max_tokens: None,
            thinking: None,
            connect_timeout: Duration::from_secs(DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_LLM_READ_TIMEOUT_SECS),
            max_event_bytes: DEFAULT_LLM_MAX_EVENT_BYTES,
        }
    }
}

#[derive(Serialize)]
struct Thinking {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking: Option<Thinking>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Streaming chat client for `/chat/completions` endpoints.
pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a client.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn stream(&self, request: ChatRequest) -> Result<ChunkStream, LlmError> {
        let body = CompletionBody {
            model: &self.config.model,
            messages: &request.messages,
            stream: true,
            temperature: request.temperature.unwrap_or(self.config.temperature),
            max_tokens: request.max_tokens.or(self.config.max_tokens),
            thinking: self.config.thinking.map(|on| Thinking {
                kind: if on { "enabled" } else { "disabled" },
            }),
        };

        let url = self.endpoint();
        debug!(url = %url, model = %self.config.model, messages = request.messages.len(), "starting completion stream");

        let mut builder = self.http.post(&url).json(&body);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
                _ => text,
            };
            warn!(status = status.as_u16(), "completion request rejected");
            return Err(LlmError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(fragments(
            response.bytes_stream().boxed(),
            self.config.max_event_bytes,
        ))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

struct StreamState {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    done: bool,
}

impl StreamState {
    fn absorb(&mut self, events: impl IntoIterator<Item = SseEvent>) -> Result<(), LlmError> {
        for event in events {
            match event {
                SseEvent::Data(data) => {
                    if let Some(text) = parse_delta(&data)? {
                        self.pending.push_back(text);
                    }
                }
                SseEvent::Done => {
                    self.done = true;
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Turn a raw SSE body into text fragments.
///
/// Ends at `[DONE]`. A body that closes before `[DONE]` was cut short and
/// ends in a decode error; so does the first error of any other kind.
fn fragments(
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    max_event_bytes: usize,
) -> ChunkStream {
    let state = StreamState {
        body,
        decoder: SseDecoder::with_max_line(max_event_bytes),
        pending: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(text) = st.pending.pop_front() {
                return Some((Ok(text), st));
            }
            if st.done {
                return None;
            }

            let step = match st.body.next().await {
                Some(Ok(chunk)) => st.decoder.push(&chunk).and_then(|events| st.absorb(events)),
                Some(Err(e)) => Err(LlmError::from(e)),
                None => {
                    let flushed = st.decoder.finish().and_then(|event| st.absorb(event));
                    let terminated = st.done;
                    st.done = true;
                    flushed.and_then(|()| {
                        if terminated {
                            Ok(())
                        } else {
                            Err(LlmError::Decode("stream ended before [DONE]".into()))
                        }
                    })
                }
            };

            if let Err(e) = step {
                st.done = true;
                st.pending.clear();
                return Some((Err(e), st));
            }
        }
    })
    .boxed()
}
