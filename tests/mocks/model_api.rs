//! Mock model provider for testing
//!
//! Serves OpenAI-style streaming chat completion responses so relay tests
//! can exercise the full proxy path without a real provider.

use std::time::Duration;

use wiremock::{
    matchers::{header_exists, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Mock model provider server wrapper
pub struct MockModelApi {
    server: MockServer,
}

impl MockModelApi {
    /// Start a new mock provider
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the mock server URI (use as `openai_api_url`)
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Format content deltas as an OpenAI-style SSE stream body
    pub fn sse_body(deltas: &[&str]) -> String {
        let mut body = String::new();
        for delta in deltas {
            let chunk = serde_json::json!({
                "id": "chatcmpl-mock",
                "object": "chat.completion.chunk",
                "created": 1706745600,
                "model": "gpt-4o-mini",
                "choices": [{"index": 0, "delta": {"content": delta}, "finish_reason": null}]
            });
            body.push_str(&format!("data: {}\n\n", chunk));
        }
        let finish = serde_json::json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion.chunk",
            "created": 1706745600,
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]
        });
        body.push_str(&format!("data: {}\n\n", finish));
        body.push_str("data: [DONE]\n\n");
        body
    }

    /// Mock a successful streaming completion emitting the given deltas
    pub async fn mock_stream(&self, deltas: &[&str]) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header_exists("Authorization"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(Self::sse_body(deltas))
                    .insert_header("content-type", "text/event-stream")
                    .insert_header("cache-control", "no-cache"),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock a streaming completion with a raw SSE body (for malformed
    /// chunk scenarios)
    pub async fn mock_stream_raw(&self, body: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body.to_string())
                    .insert_header("content-type", "text/event-stream"),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock an upstream failure with the given status
    pub async fn mock_error(&self, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "error": {"message": message, "type": "server_error"}
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock a stream that stalls before responding, for cancellation tests
    pub async fn mock_stream_with_delay(&self, deltas: &[&str], delay: Duration) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(Self::sse_body(deltas))
                    .insert_header("content-type", "text/event-stream")
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Requests the provider has received so far
    pub async fn received_requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}
