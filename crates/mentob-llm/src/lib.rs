//! LLM clients for mentob.
//!
//! The server talks to models only through [`LlmClient`], which yields a
//! stream of text fragments. Two implementations are provided:
//! - [`OpenAiClient`]: any OpenAI-compatible `/chat/completions` endpoint
//! - [`ScriptedClient`]: replays canned fragments (offline mode, tests)
//!
//! The [`prompt`] module builds the reading, follow-up and suggestion
//! requests.

mod error;
mod openai;
pub mod prompt;
mod scripted;
pub mod sse;
mod traits;
mod types;

pub use error::LlmError;
pub use openai::{OpenAiClient, OpenAiConfig};
pub use scripted::ScriptedClient;
pub use traits::{ChunkStream, LlmClient};
pub use types::{ChatMessage, ChatRequest, Role};
