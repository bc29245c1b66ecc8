//! LLM client trait.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;

use crate::error::LlmError;
use crate::types::ChatRequest;

/// Stream of text fragments in arrival order.
///
/// Dropping the stream abandons the request and closes the upstream
/// connection.
pub type ChunkStream = BoxStream<'static, Result<String, LlmError>>;

/// A chat model that can stream its answer.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Start a streamed completion.
    ///
    /// Errors returned here happen before any fragment was produced;
    /// mid-stream failures arrive as `Err` items.
    async fn stream(&self, request: ChatRequest) -> Result<ChunkStream, LlmError>;

    /// Run a completion to the end and return the whole text.
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        let mut stream = self.stream(request).await?;
        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            text.push_str(&chunk?);
        }
        Ok(text)
    }

    /// Short provider name for logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<C: LlmClient + ?Sized> LlmClient for Arc<C> {
    #[inline]
    async fn stream(&self, request: ChatRequest) -> Result<ChunkStream, LlmError> {
        (**self).stream(request).await
    }

    #[inline]
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        (**self).complete(request).await
    }

    #[inline]
    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<C: LlmClient + ?Sized> LlmClient for Box<C> {
    #[inline]
    async fn stream(&self, request: ChatRequest) -> Result<ChunkStream, LlmError> {
        (**self).stream(request).await
    }

    #[inline]
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        (**self).complete(request).await
    }

    #[inline]
    fn name(&self) -> &str {
        (**self).name()
    }
}
