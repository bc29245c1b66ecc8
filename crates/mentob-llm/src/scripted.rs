//! Deterministic client for offline mode and tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use parking_lot::Mutex;

use crate::error::LlmError;
use crate::traits::{ChunkStream, LlmClient};
use crate::types::ChatRequest;

/// Replays a fixed list of fragments.
///
/// Every call is counted and the last request is kept, so tests can assert
/// whether (and with what prompt) the model was reached.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    chunks: Vec<String>,
    fail_after: Option<usize>,
    reject: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl ScriptedClient {
    /// Client that streams `chunks` and completes.
    pub fn new<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Fail mid-stream after `n` fragments were yielded.
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Refuse the request before any fragment.
    pub fn rejecting(mut self) -> Self {
        self.reject = true;
        self
    }

    /// Wait this long before each fragment.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Wrap in an `Arc` (the form the server shares).
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of `stream` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().clone()
    }

    /// The full text a successful run produces.
    pub fn full_text(&self) -> String {
        self.chunks.concat()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn stream(&self, request: ChatRequest) -> Result<ChunkStream, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request);

        if self.reject {
            return Err(LlmError::Status {
                status: 503,
                message: "scripted rejection".to_string(),
            });
        }

        let mut items: Vec<Result<String, LlmError>> = match self.fail_after {
            Some(n) => self.chunks.iter().take(n).cloned().map(Ok).collect(),
            None => self.chunks.iter().cloned().map(Ok).collect(),
        };
        if self.fail_after.is_some() {
            items.push(Err(LlmError::Provider("scripted failure".to_string())));
        }

        let delay = self.delay;
        Ok(stream::iter(items)
            .then(move |item| async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                item
            })
            .boxed())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    fn request() -> ChatRequest {
        ChatRequest::new(vec![ChatMessage::user("question")])
    }

    #[tokio::test]
    async fn replays_chunks_in_order() {
        let client = ScriptedClient::new(["The ", "Moon ", "rises."]);
        let text = client.complete(request()).await.unwrap();
        assert_eq!(text, "The Moon rises.");
        assert_eq!(client.calls(), 1);
        assert_eq!(client.last_request(), Some(request()));
    }

    #[tokio::test]
    async fn fails_after_n_chunks() {
        let client = ScriptedClient::new(["a", "b", "c"]).fail_after(2);
        let items: Vec<_> = client.stream(request()).await.unwrap().collect().await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].as_deref().unwrap(), "b");
        assert!(items[2].is_err());
        assert!(client.complete(request()).await.is_err());
    }

    #[tokio::test]
    async fn rejection_counts_as_call() {
        let client = ScriptedClient::new(["x"]).rejecting();
        assert!(matches!(
            client.stream(request()).await,
            Err(LlmError::Status { status: 503, .. })
        ));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn shared_client_is_usable_through_arc() {
        let client = ScriptedClient::new(["ok"]).shared();
        let dyn_client: Arc<dyn LlmClient> = client.clone();
        assert_eq!(dyn_client.complete(request()).await.unwrap(), "ok");
        assert_eq!(client.calls(), 1);
    }
}
