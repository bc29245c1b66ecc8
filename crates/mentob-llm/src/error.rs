//! LLM client errors.

/// LLM client error.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Connection or I/O failure talking to the provider.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },

    /// A response or stream event could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The provider reported an error inside the stream.
    #[error("provider error: {0}")]
    Provider(String),

    /// The request did not finish in time.
    #[error("request timed out")]
    Timeout,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
