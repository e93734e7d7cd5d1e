//! Mock brain endpoint for streaming-client tests
//!
//! Serves SSE bodies in the relay frame grammar (`data: {"token": ...}`,
//! `data: [DONE]`) that the client consumes directly.

use std::time::Duration;

use wiremock::{
    matchers::{header_exists, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Path the client posts to on this mock
pub const BRAIN_PATH: &str = "/brain-stream";

/// Mock brain endpoint wrapper
pub struct MockBrain {
    server: MockServer,
}

impl MockBrain {
    /// Start a new mock brain endpoint
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Full URL of the streaming endpoint
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.server.uri(), BRAIN_PATH)
    }

    /// Format tokens as a relay-grammar SSE body ending with `[DONE]`
    pub fn sse_body(tokens: &[&str]) -> String {
        let mut body = String::new();
        for token in tokens {
            body.push_str(&format!("data: {}\n\n", serde_json::json!({"token": token})));
        }
        body.push_str("data: [DONE]\n\n");
        body
    }

    /// Mock a successful token stream; requires a bearer credential
    pub async fn mock_token_stream(&self, tokens: &[&str]) {
        self.mock_raw(&Self::sse_body(tokens)).await;
    }

    /// Mock a raw SSE body (for malformed-frame and side-channel scenarios)
    pub async fn mock_raw(&self, body: &str) {
        Mock::given(method("POST"))
            .and(path(BRAIN_PATH))
            .and(header_exists("Authorization"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body.to_string())
                    .insert_header("content-type", "text/event-stream")
                    .insert_header("cache-control", "no-cache"),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock an HTTP-level failure
    pub async fn mock_error(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(BRAIN_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mock a stream that stalls before responding, keeping client
    /// requests in flight for cancellation tests
    pub async fn mock_token_stream_with_delay(&self, tokens: &[&str], delay: Duration) {
        Mock::given(method("POST"))
            .and(path(BRAIN_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(Self::sse_body(tokens))
                    .insert_header("content-type", "text/event-stream")
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Requests the brain endpoint has received so far
    pub async fn received_requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}
