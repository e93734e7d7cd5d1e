//! Streaming client for the brain SSE endpoint
//!
//! Drives one HTTP streaming request to completion, decoding the relay's
//! SSE grammar into token/JSON events for consumer callbacks. Supports
//! multiple concurrent named streams with individual and bulk cooperative
//! cancellation.
//!
//! The active-stream registry is instance state, not a module-level
//! singleton: two clients never see each other's streams.

pub mod session;

pub use session::{SessionProvider, StaticSession};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::streaming::{RelayFrame, SseLineBuffer, DATA_PREFIX};

/// Errors surfaced by the streaming client.
///
/// Cancellation is deliberately absent: an aborted stream resolves with an
/// empty string, not an error.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No active session")]
    NotAuthenticated,

    #[error("Brain endpoint returned status {0}")]
    HttpStatus(u16),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Attachment forwarded alongside the message
#[derive(Debug, Clone, Serialize)]
pub struct AttachedFile {
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub base64: String,
}

/// Parameters for one streaming request
#[derive(Debug, Clone, Serialize, Default)]
pub struct StreamParams {
    pub message: String,
    pub language: String,
    #[serde(rename = "conversationId")]
    pub conversation_id: Option<String>,
    #[serde(rename = "activeTrigger")]
    pub active_trigger: Option<String>,
    #[serde(rename = "attachedFiles")]
    pub attached_files: Vec<AttachedFile>,
}

/// Wire body: the caller's params plus the always-on streaming flag
#[derive(Serialize)]
struct WireRequest<'a> {
    #[serde(flatten)]
    params: &'a StreamParams,
    stream: bool,
}

/// Event callbacks for one stream. All optional.
///
/// `on_token` receives the *cumulative* text so far, not the delta.
/// `on_complete` fires exactly once on the success sentinel; `on_error` at
/// most once on failure; a cancelled stream fires neither. `on_skipped` is
/// a diagnostic hook for data lines dropped as malformed — skipping is
/// deliberate, but it should be observable in tests.
#[derive(Default)]
pub struct StreamCallbacks {
    pub on_token: Option<Box<dyn FnMut(&str) + Send>>,
    pub on_json: Option<Box<dyn FnMut(&serde_json::Value) + Send>>,
    pub on_complete: Option<Box<dyn FnMut(&str) + Send>>,
    pub on_error: Option<Box<dyn FnMut(&str) + Send>>,
    pub on_skipped: Option<Box<dyn FnMut(&str) + Send>>,
}

impl StreamCallbacks {
    fn token(&mut self, cumulative: &str) {
        if let Some(f) = self.on_token.as_mut() {
            f(cumulative);
        }
    }

    fn json(&mut self, value: &serde_json::Value) {
        if let Some(f) = self.on_json.as_mut() {
            f(value);
        }
    }

    fn complete(&mut self, text: &str) {
        if let Some(f) = self.on_complete.as_mut() {
            f(text);
        }
    }

    fn error(&mut self, message: &str) {
        if let Some(f) = self.on_error.as_mut() {
            f(message);
        }
    }

    fn skipped(&mut self, payload: &str) {
        if let Some(f) = self.on_skipped.as_mut() {
            f(payload);
        }
    }
}

/// How one stream ended, internally
enum StreamOutcome {
    Completed(String),
    Cancelled,
}

/// Client for the brain streaming endpoint
pub struct StreamingClient {
    http: reqwest::Client,
    brain_url: String,
    session: Arc<dyn SessionProvider>,
    active: Mutex<HashMap<String, CancellationToken>>,
}

impl StreamingClient {
    /// Create a client for the given brain endpoint URL
    pub fn new(
        http: reqwest::Client,
        brain_url: impl Into<String>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            http,
            brain_url: brain_url.into(),
            session,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Number of streams currently registered
    pub fn active_streams(&self) -> usize {
        self.active.lock().unwrap().len()
    }

    /// Drive one streaming request to completion.
    ///
    /// Returns the final concatenated text, or an empty string if the
    /// stream was cancelled. Fails fast with `NotAuthenticated` before any
    /// network traffic when the session yields no token. The stream is
    /// registered under `stream_id` (generated when `None`) before the
    /// request goes out and deregistered on every outcome.
    ///
    /// No retry is attempted here; retry policy belongs to the caller.
    pub async fn stream_response(
        &self,
        stream_id: Option<String>,
        params: StreamParams,
        mut callbacks: StreamCallbacks,
    ) -> Result<String, ClientError> {
        let token = self
            .session
            .bearer_token()
            .await
            .ok_or(ClientError::NotAuthenticated)?;

        let id = stream_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let cancel = CancellationToken::new();
        self.active.lock().unwrap().insert(id.clone(), cancel.clone());

        debug!(stream_id = %id, "Stream registered");
        let outcome = self.run_stream(&token, &params, &cancel, &mut callbacks).await;
        self.active.lock().unwrap().remove(&id);

        match outcome {
            Ok(StreamOutcome::Completed(text)) => {
                info!(stream_id = %id, chars = text.len(), "Stream completed");
                Ok(text)
            }
            Ok(StreamOutcome::Cancelled) => {
                info!(stream_id = %id, "Stream cancelled");
                Ok(String::new())
            }
            Err(e) => {
                warn!(stream_id = %id, error = %e, "Stream failed");
                callbacks.error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Cancel one stream by id. Unknown ids are a no-op; calling twice on
    /// the same id, or on a stream that already finished, is harmless and
    /// never affects other streams.
    pub fn cancel_stream(&self, stream_id: &str) {
        if let Some(token) = self.active.lock().unwrap().remove(stream_id) {
            debug!(stream_id = %stream_id, "Cancelling stream");
            token.cancel();
        }
    }

    /// Cancel every registered stream and clear the registry. Used for
    /// bulk teardown, e.g. when the consumer navigates away.
    pub fn cancel_all_streams(&self) {
        let mut active = self.active.lock().unwrap();
        let count = active.len();
        for (_, token) in active.drain() {
            token.cancel();
        }
        if count > 0 {
            info!(count = count, "Cancelled all active streams");
        }
    }

    async fn run_stream(
        &self,
        token: &str,
        params: &StreamParams,
        cancel: &CancellationToken,
        callbacks: &mut StreamCallbacks,
    ) -> Result<StreamOutcome, ClientError> {
        let request = self
            .http
            .post(&self.brain_url)
            .bearer_auth(token)
            .json(&WireRequest {
                params,
                stream: true,
            });

        let response = tokio::select! {
            _ = cancel.cancelled() => return Ok(StreamOutcome::Cancelled),
            result = request.send() => result?,
        };

        if !response.status().is_success() {
            return Err(ClientError::HttpStatus(response.status().as_u16()));
        }

        let body = response.bytes_stream();
        futures::pin_mut!(body);

        let mut lines = SseLineBuffer::new();
        let mut accumulated = String::new();

        loop {
            let chunk = tokio::select! {
                _ = cancel.cancelled() => return Ok(StreamOutcome::Cancelled),
                chunk = body.next() => chunk,
            };

            match chunk {
                Some(Ok(bytes)) => {
                    for line in lines.feed(&bytes) {
                        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
                            continue;
                        };
                        match RelayFrame::parse_payload(payload) {
                            Some(RelayFrame::Done) => {
                                callbacks.complete(&accumulated);
                                return Ok(StreamOutcome::Completed(accumulated));
                            }
                            Some(RelayFrame::Token(delta)) => {
                                accumulated.push_str(&delta);
                                callbacks.token(&accumulated);
                            }
                            Some(RelayFrame::Json(value)) => {
                                callbacks.json(&value);
                            }
                            Some(RelayFrame::Error(message)) => {
                                return Err(ClientError::Stream(message));
                            }
                            None => {
                                // Malformed frame: skip and keep reading
                                debug!(payload = %payload, "Skipping malformed data line");
                                callbacks.skipped(payload);
                            }
                        }
                    }
                }
                Some(Err(e)) => return Err(ClientError::Transport(e)),
                None => {
                    // Stream closed without a terminal frame. Treat the
                    // accumulated text as the result, mirroring a reader
                    // loop that finalizes on EOF.
                    callbacks.complete(&accumulated);
                    return Ok(StreamOutcome::Completed(accumulated));
                }
            }
        }
    }
}
