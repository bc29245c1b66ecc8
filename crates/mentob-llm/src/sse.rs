//! Server-sent events decoding for OpenAI-compatible streams.
//!
//! The body arrives in arbitrary byte chunks; lines (and UTF-8 sequences) may
//! be split across them, so bytes are buffered until a full line is seen.

use mentob_core::DEFAULT_LLM_MAX_EVENT_BYTES;
use serde::Deserialize;

use crate::error::LlmError;

/// A decoded stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Payload of a `data:` line.
    Data(String),
    /// The `data: [DONE]` terminator.
    Done,
}

/// Incremental line decoder.
///
/// A single line may not exceed `max_line` bytes; a provider that never
/// sends a newline fails the stream instead of growing the buffer.
#[derive(Debug)]
pub struct SseDecoder {
    buf: Vec<u8>,
    /// Prefix of `buf` already known to hold no newline.
    scanned: usize,
    max_line: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_line(DEFAULT_LLM_MAX_EVENT_BYTES)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buf: Vec::new(),
            scanned: 0,
            max_line,
        }
    }

    /// Feed a chunk, returning every event completed by it.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<SseEvent>, LlmError> {
        self.buf.extend_from_slice(bytes);
        let mut events = Vec::new();
        let mut line_start = 0;
        let mut cursor = self.scanned;

        while let Some(offset) = self.buf[cursor..].iter().position(|&b| b == b'\n') {
            let end = cursor + offset;
            if end - line_start > self.max_line {
                return Err(self.too_long());
            }
            if let Some(event) = Self::decode_line(&self.buf[line_start..=end])? {
                events.push(event);
            }
            line_start = end + 1;
            cursor = line_start;
        }

        self.buf.drain(..line_start);
        self.scanned = self.buf.len();
        if self.buf.len() > self.max_line {
            return Err(self.too_long());
        }
        Ok(events)
    }

    /// Flush a trailing line that had no newline.
    pub fn finish(&mut self) -> Result<Option<SseEvent>, LlmError> {
        self.scanned = 0;
        if self.buf.is_empty() {
            return Ok(None);
        }
        let line = std::mem::take(&mut self.buf);
        Self::decode_line(&line)
    }

    fn too_long(&self) -> LlmError {
        LlmError::Decode(format!(
            "stream line exceeds {} bytes",
            self.max_line
        ))
    }

    fn decode_line(raw: &[u8]) -> Result<Option<SseEvent>, LlmError> {
        let line = std::str::from_utf8(raw)
            .map_err(|e| LlmError::Decode(format!("invalid utf-8 in stream: {e}")))?;
        let line = line.trim_end_matches(['\r', '\n']);

        // Comments, event names, ids and blank separators carry no text.
        let Some(data) = line.strip_prefix("data:") else {
            return Ok(None);
        };
        let data = data.strip_prefix(' ').unwrap_or(data);
        if data == "[DONE]" {
            return Ok(Some(SseEvent::Done));
        }
        Ok(Some(SseEvent::Data(data.to_string())))
    }
}

#[derive(Deserialize)]
struct StreamEvent {
    #[serde(default)]
    choices: Vec<ChoiceDelta>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ChoiceDelta {
    #[serde(default)]
    delta: Delta,
}

#[derive(Deserialize, Default)]
struct Delta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extract the text fragment from a chat completion chunk.
///
/// Returns `None` for role-only, reasoning-only or otherwise empty deltas.
pub fn parse_delta(data: &str) -> Result<Option<String>, LlmError> {
    let event: StreamEvent = serde_json::from_str(data)?;
    if let Some(error) = event.error {
        return Err(LlmError::Provider(error.message));
    }
    Ok(event
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(s: &str) -> SseEvent {
        SseEvent::Data(s.to_string())
    }

    #[test]
    fn decodes_complete_lines() {
        let mut decoder = SseDecoder::new();
        let events = decoder
            .push(b"data: {\"a\":1}\n\ndata: {\"b\":2}\n\ndata: [DONE]\n\n")
            .unwrap();
        assert_eq!(events, vec![data("{\"a\":1}"), data("{\"b\":2}"), SseEvent::Done]);
    }

    #[test]
    fn reassembles_split_lines() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"da").unwrap().is_empty());
        assert!(decoder.push(b"ta: hel").unwrap().is_empty());
        assert_eq!(decoder.push(b"lo\r\n").unwrap(), vec![data("hello")]);
    }

    #[test]
    fn reassembles_split_utf8() {
        let bytes = "data: ☾\n".as_bytes();
        let mut decoder = SseDecoder::new();
        // Split inside the three-byte moon glyph.
        assert!(decoder.push(&bytes[..7]).unwrap().is_empty());
        assert_eq!(decoder.push(&bytes[7..]).unwrap(), vec![data("☾")]);
    }

    #[test]
    fn ignores_comments_and_other_fields() {
        let mut decoder = SseDecoder::new();
        let events = decoder
            .push(b": keep-alive\nevent: message\nid: 7\ndata:x\n")
            .unwrap();
        assert_eq!(events, vec![data("x")]);
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut decoder = SseDecoder::new();
        decoder.push(b"data: [DONE]").unwrap();
        assert_eq!(decoder.finish().unwrap(), Some(SseEvent::Done));
        assert_eq!(decoder.finish().unwrap(), None);
    }

    #[test]
    fn unterminated_line_over_the_cap_fails() {
        let mut decoder = SseDecoder::with_max_line(16);
        assert!(decoder.push(b"data: 0123").unwrap().is_empty());
        assert!(matches!(
            decoder.push(b"456789abcdef"),
            Err(LlmError::Decode(m)) if m.contains("16 bytes")
        ));
    }

    #[test]
    fn complete_line_over_the_cap_fails() {
        let mut decoder = SseDecoder::with_max_line(16);
        assert!(matches!(
            decoder.push(b"data: 0123456789abcdef\n"),
            Err(LlmError::Decode(_))
        ));
    }

    #[test]
    fn line_at_the_cap_is_accepted() {
        // "data: 0123456789" is exactly 16 bytes before the newline.
        let mut decoder = SseDecoder::with_max_line(16);
        assert_eq!(decoder.push(b"data: 0123456789\n").unwrap(), vec![data("0123456789")]);
    }

    #[test]
    fn many_small_chunks_keep_one_line() {
        let mut decoder = SseDecoder::with_max_line(64);
        for b in b"data: piecewise" {
            assert!(decoder.push(&[*b]).unwrap().is_empty());
        }
        assert_eq!(decoder.push(b"\n").unwrap(), vec![data("piecewise")]);
    }

    #[test]
    fn parses_content_delta() {
        let chunk = r#"{"id":"c1","choices":[{"index":0,"delta":{"content":"The Tower"}}]}"#;
        assert_eq!(parse_delta(chunk).unwrap().as_deref(), Some("The Tower"));
    }

    #[test]
    fn skips_empty_deltas() {
        let role_only = r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#;
        let empty = r#"{"choices":[{"index":0,"delta":{"content":""}}]}"#;
        let finish = r#"{"choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#;
        let no_choices = r#"{"choices":[],"usage":{"total_tokens":9}}"#;
        for chunk in [role_only, empty, finish, no_choices] {
            assert_eq!(parse_delta(chunk).unwrap(), None, "{chunk}");
        }
    }

    #[test]
    fn surfaces_stream_errors() {
        let chunk = r#"{"error":{"message":"rate limited","type":"requests"}}"#;
        assert!(matches!(parse_delta(chunk), Err(LlmError::Provider(m)) if m == "rate limited"));
        assert!(matches!(parse_delta("not json"), Err(LlmError::Decode(_))));
    }
}
