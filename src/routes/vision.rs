//! Vision streaming endpoint
//!
//! Accepts a multimodal prompt, proxies it to the streaming model API, and
//! re-emits a normalized SSE stream. While the stream is young, deltas are
//! also run through the incremental JSON scanner so a structured payload
//! embedded in the model's prose can be surfaced early on a side channel.
//! The side channel is additive: every delta is forwarded as a token frame
//! whether or not it contributed to the captured JSON.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Json,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    error::AppError,
    prompt::{build_system_instruction, normalize_mime, PersonalTouch, DEFAULT_PROMPT},
    provider::{ByteStream, ChatMessage, ContentPart, ImageUrl, MessageContent, StreamRequest},
    streaming::{scanner::JsonScanner, RelayFrame, SseLineBuffer, DATA_PREFIX},
    AppState,
};

/// Sampling is fixed: bounded output, low temperature for factual
/// consistency across repeated calls on the same image.
const MAX_TOKENS: u32 = 1024;
const TEMPERATURE: f64 = 0.2;

/// One uploaded image
#[derive(Debug, Clone, Deserialize)]
pub struct ImagePayload {
    pub base64: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// Incremental chunk from the provider's SSE stream
#[derive(Debug, Deserialize)]
struct ProviderChunk {
    #[serde(default)]
    choices: Vec<ProviderChoice>,
}

#[derive(Debug, Deserialize, Default)]
struct ProviderChoice {
    #[serde(default)]
    delta: ProviderDelta,
}

#[derive(Debug, Deserialize, Default)]
struct ProviderDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Handle `POST /api/vision-stream`.
///
/// The response is always `200 text/event-stream`; failures after this
/// point travel in-band as a single error frame, because the original
/// contract commits to the stream before validating anything.
pub async fn vision_stream(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, AppError> {
    // images must be a non-empty array
    let images = match body.get("images").and_then(|v| v.as_array()) {
        Some(arr) if !arr.is_empty() => arr.clone(),
        _ => {
            warn!("Vision request rejected: no images");
            return error_stream_response("No images");
        }
    };

    let images: Vec<ImagePayload> = match images
        .iter()
        .map(|v| serde_json::from_value(v.clone()))
        .collect::<Result<_, _>>()
    {
        Ok(images) => images,
        Err(e) => {
            warn!(error = %e, "Vision request rejected: malformed image entry");
            return error_stream_response(&format!("Invalid image payload: {}", e));
        }
    };

    let prompt = body
        .get("prompt")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_PROMPT);
    let language = body
        .get("language")
        .and_then(|v| v.as_str())
        .unwrap_or("en");
    let personal: Option<PersonalTouch> = body
        .get("personalTouch")
        .and_then(|v| serde_json::from_value(v.clone()).ok());

    let system = build_system_instruction(language, personal.as_ref());

    let mut parts = vec![ContentPart::Text {
        text: prompt.to_string(),
    }];
    for image in &images {
        parts.push(ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!(
                    "data:{};base64,{}",
                    normalize_mime(&image.mime_type),
                    image.base64
                ),
            },
        });
    }

    let request = StreamRequest {
        model: state.config.vision_model.clone(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: MessageContent::Text(system),
            },
            ChatMessage {
                role: "user".to_string(),
                content: MessageContent::Parts(parts),
            },
        ],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
        stream: true,
    };

    info!(
        model = %request.model,
        images = images.len(),
        language = %language,
        "Processing vision stream request"
    );

    let upstream = match state.provider.vision_stream(&request).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "Failed to open provider stream");
            return error_stream_response(&e.to_string());
        }
    };

    sse_response(Body::from_stream(relay_stream(upstream)))
}

/// Transform the provider's SSE byte stream into relay frames.
///
/// Frame order per stream: zero-or-one JSON frame, token frames in arrival
/// order, exactly one terminal frame. The scanner stops being consulted
/// once it has yielded; tokens keep flowing regardless. Dropping the
/// returned stream (client disconnect) drops the upstream reqwest stream
/// with it, which cancels provider-side generation.
fn relay_stream(upstream: ByteStream) -> impl Stream<Item = Result<bytes::Bytes, Infallible>> {
    async_stream::stream! {
        let mut upstream = upstream;
        let mut lines = SseLineBuffer::new();
        let mut scanner = JsonScanner::new();
        let mut json_emitted = false;

        loop {
            match upstream.next().await {
                Some(Ok(chunk)) => {
                    for line in lines.feed(&chunk) {
                        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
                            continue;
                        };
                        let payload = payload.trim();

                        if payload == "[DONE]" {
                            yield Ok::<_, Infallible>(RelayFrame::Done.to_bytes());
                            return;
                        }

                        let Some(delta) = parse_delta(payload) else {
                            continue;
                        };
                        if delta.is_empty() {
                            continue;
                        }

                        if !json_emitted {
                            if let Some(value) = scanner.feed(&delta) {
                                json_emitted = true;
                                debug!("Structured payload captured from stream");
                                yield Ok(RelayFrame::Json(value).to_bytes());
                            }
                        }

                        yield Ok(RelayFrame::Token(delta).to_bytes());
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Provider stream failed mid-flight");
                    yield Ok(RelayFrame::Error(e.to_string()).to_bytes());
                    return;
                }
                None => {
                    // Provider closed without [DONE]; still exactly one terminal frame
                    yield Ok(RelayFrame::Done.to_bytes());
                    return;
                }
            }
        }
    }
}

/// Extract the text delta from one provider chunk payload.
///
/// Malformed chunks are skipped, not fatal — a single bad frame must not
/// take down an otherwise healthy stream.
fn parse_delta(payload: &str) -> Option<String> {
    match serde_json::from_str::<ProviderChunk>(payload) {
        Ok(chunk) => chunk.choices.into_iter().next().and_then(|c| c.delta.content),
        Err(e) => {
            debug!(error = %e, "Skipping unparseable provider chunk");
            None
        }
    }
}

/// A stream response carrying exactly one error frame
fn error_stream_response(message: &str) -> Result<Response, AppError> {
    let frame = RelayFrame::Error(message.to_string()).to_bytes();
    sse_response(Body::from(frame))
}

/// Build the SSE response envelope. Caching is disabled and proxy
/// buffering suppressed so frames reach the browser as they are written.
fn sse_response(body: Body) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header("X-Accel-Buffering", "no")
        .body(body)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
}
