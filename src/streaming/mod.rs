//! SSE (Server-Sent Events) streaming utilities
//!
//! Provides the wire vocabulary shared by both sides of the relay: a line
//! buffer for reassembling SSE lines from arbitrary byte chunks, and the
//! `RelayFrame` grammar emitted by the server and consumed by the client.

pub mod scanner;

use bytes::Bytes;
use serde_json::json;

/// Buffer for accumulating incomplete SSE lines across chunk boundaries.
///
/// Network chunks rarely align with line boundaries; a `data:` line can be
/// split anywhere, including in the middle of a multi-byte UTF-8 sequence.
/// Bytes are accumulated and complete lines (terminated by `\n`) are
/// handed back with the terminator stripped.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes into the buffer and return any complete lines.
    ///
    /// Empty lines (the SSE event separator) are dropped. Trailing data
    /// with no terminator yet is retained for the next call, so a UTF-8
    /// sequence split across chunks decodes intact once completed.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop(); // the \n itself
            if !line.is_empty() {
                lines.push(String::from_utf8_lossy(&line).into_owned());
            }
        }
        lines
    }

    /// True if a partial line is still buffered.
    ///
    /// Useful for detecting truncated streams at end of response.
    pub fn has_incomplete(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// The SSE data prefix used by the relay grammar.
pub const DATA_PREFIX: &str = "data: ";

/// One frame of the relay's SSE grammar.
///
/// Per stream the server emits: zero or one `Json` frame, any number of
/// `Token` frames, then exactly one terminal frame (`Done` on success,
/// `Error` otherwise).
#[derive(Debug, Clone, PartialEq)]
pub enum RelayFrame {
    /// Early structured payload extracted from the token stream, at most
    /// once per stream. Emission is additive: the characters that formed
    /// the JSON are still forwarded as tokens.
    Json(serde_json::Value),
    /// One incremental text delta from the model.
    Token(String),
    /// Terminal in-band failure. The HTTP status stays 200 because the
    /// response was committed before the failure.
    Error(String),
    /// Terminal success sentinel, written as `data: [DONE]`.
    Done,
}

impl RelayFrame {
    /// Serialize this frame as SSE bytes (`data: <payload>\n\n`).
    pub fn to_bytes(&self) -> Bytes {
        match self {
            RelayFrame::Json(value) => Bytes::from(format!("{}{}\n\n", DATA_PREFIX, json!({ "json": value }))),
            RelayFrame::Token(text) => Bytes::from(format!("{}{}\n\n", DATA_PREFIX, json!({ "token": text }))),
            RelayFrame::Error(message) => {
                Bytes::from(format!("{}{}\n\n", DATA_PREFIX, json!({ "error": message })))
            }
            RelayFrame::Done => Bytes::from_static(b"data: [DONE]\n\n"),
        }
    }

    /// Parse the payload of a `data:` line (prefix already stripped).
    ///
    /// Returns `None` for malformed payloads; the caller is expected to
    /// skip those and keep reading. Tolerance is part of the contract.
    pub fn parse_payload(payload: &str) -> Option<RelayFrame> {
        let payload = payload.trim();
        if payload == "[DONE]" {
            return Some(RelayFrame::Done);
        }

        let value: serde_json::Value = serde_json::from_str(payload).ok()?;
        if let Some(token) = value.get("token").and_then(|t| t.as_str()) {
            return Some(RelayFrame::Token(token.to_string()));
        }
        if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
            return Some(RelayFrame::Error(message.to_string()));
        }
        if let Some(payload) = value.get("json") {
            return Some(RelayFrame::Json(payload.clone()));
        }
        None
    }

    /// Parse a full SSE line, returning `None` for non-data lines and
    /// malformed payloads alike.
    pub fn parse_line(line: &str) -> Option<RelayFrame> {
        Self::parse_payload(line.strip_prefix(DATA_PREFIX)?)
    }
}
