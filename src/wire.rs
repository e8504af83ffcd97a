//! Wire types for the OpenAI-compatible chat completion API, and the
//! line parser for its streaming (SSE) mode.
//!
//! The streaming format sends lines like:
//!
//! ```text
//! data: {"choices":[{"delta":{"content":"Hello"}}]}
//!
//! data: {"choices":[{"delta":{"content":" world"}}]}
//!
//! data: [DONE]
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

/// End-of-stream sentinel.
const DONE_SENTINEL: &str = "[DONE]";

/// System preamble sent with every request.
pub(crate) const SYSTEM_PREAMBLE: &str = "You are a helpful assistant.";

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    System,
    User,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl ChatRequest {
    /// Build a request from a single user prompt plus the fixed system
    /// preamble.
    pub fn from_prompt(model: &str, prompt: &str, stream: bool) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: SYSTEM_PREAMBLE.to_string(),
                },
                ChatMessage {
                    role: Role::User,
                    content: prompt.to_string(),
                },
            ],
            stream,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Extract `choices[0].message.content`, if the full path is present.
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
    }
}

#[derive(Debug, Deserialize)]
struct StreamFrame {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

/// Classification of one line of a streaming response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StreamLine {
    /// A text fragment from `choices[0].delta.content`.
    Delta(String),
    /// The `[DONE]` sentinel; the stream is over.
    Done,
    /// Nothing to yield: blank line, non-payload line, malformed JSON, or
    /// a frame without content (e.g. a role-only opening delta).
    Skip,
}

/// Classify a single line of the streaming response.
///
/// Malformed JSON payloads are logged and skipped; they never terminate
/// the stream.
pub(crate) fn parse_stream_line(line: &str) -> StreamLine {
    let line = line.trim_end_matches('\r');
    if line.is_empty() {
        return StreamLine::Skip;
    }

    let Some(payload) = line.strip_prefix("data:") else {
        return StreamLine::Skip;
    };
    let payload = payload.trim();

    if payload == DONE_SENTINEL {
        return StreamLine::Done;
    }

    let frame: StreamFrame = match serde_json::from_str(payload) {
        Ok(frame) => frame,
        Err(error) => {
            warn!(%error, payload, "skipping unparseable stream frame");
            return StreamLine::Skip;
        }
    };

    match frame
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
    {
        Some(content) if !content.is_empty() => StreamLine::Delta(content),
        _ => StreamLine::Skip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_skipped() {
        assert_eq!(parse_stream_line(""), StreamLine::Skip);
    }

    #[test]
    fn non_data_line_skipped() {
        assert_eq!(parse_stream_line(": keep-alive"), StreamLine::Skip);
        assert_eq!(parse_stream_line("event: message"), StreamLine::Skip);
    }

    #[test]
    fn done_sentinel_ends_stream() {
        assert_eq!(parse_stream_line("data: [DONE]"), StreamLine::Done);
        assert_eq!(parse_stream_line("data:[DONE]"), StreamLine::Done);
    }

    #[test]
    fn delta_content_yielded() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hello"}}]}"#;
        assert_eq!(parse_stream_line(line), StreamLine::Delta("Hello".into()));
    }

    #[test]
    fn malformed_json_skipped() {
        assert_eq!(parse_stream_line("data: {not json}"), StreamLine::Skip);
    }

    #[test]
    fn role_only_delta_skipped() {
        let line = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_stream_line(line), StreamLine::Skip);
    }

    #[test]
    fn empty_content_skipped() {
        let line = r#"data: {"choices":[{"delta":{"content":""}}]}"#;
        assert_eq!(parse_stream_line(line), StreamLine::Skip);
    }

    #[test]
    fn empty_choices_skipped() {
        assert_eq!(parse_stream_line(r#"data: {"choices":[]}"#), StreamLine::Skip);
    }

    #[test]
    fn trailing_carriage_return_handled() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\r";
        assert_eq!(parse_stream_line(line), StreamLine::Delta("Hi".into()));
    }

    #[test]
    fn blocking_response_content_path() {
        let body = r#"{"choices":[{"message":{"content":"OK"}}]}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.into_content().as_deref(), Some("OK"));
    }

    #[test]
    fn blocking_response_missing_content() {
        let body = r#"{"choices":[{"message":{}}]}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.into_content(), None);

        let body = r#"{"choices":[]}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.into_content(), None);
    }

    #[test]
    fn request_carries_preamble_and_prompt() {
        let request = ChatRequest::from_prompt("test-model", "hi", false);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "test-model");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], SYSTEM_PREAMBLE);
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hi");
    }
}
