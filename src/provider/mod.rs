//! Model provider abstraction layer
//!
//! Defines the trait interface for the upstream streaming model API, plus
//! the request types the relay assembles. Keeping the trait object-safe
//! lets tests swap in a provider pointed at a mock server.

pub mod openai;

pub use openai::OpenAIProvider;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::Serialize;
use std::pin::Pin;

use crate::error::AppResult;

/// Stream type for raw SSE bytes from the provider
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// One part of a multimodal user message
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// Image reference carried as a base64 data URL
#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Message content: a plain string for system messages, parts for
/// multimodal user messages
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Chat message in the provider's wire format
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

/// Outbound streaming chat completion request.
///
/// Constructed per call and discarded once the HTTP request is issued.
#[derive(Debug, Clone, Serialize)]
pub struct StreamRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub stream: bool,
}

/// Trait defining the interface for streaming model providers.
///
/// Implementations MUST use provider-specific API keys from configuration
/// and never accept credentials from the incoming request.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Open a streaming chat completion and return the raw SSE byte stream.
    ///
    /// A non-success upstream status is surfaced as an error before any
    /// bytes are yielded.
    async fn vision_stream(&self, request: &StreamRequest) -> AppResult<ByteStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multimodal_request_serialization() {
        let request = StreamRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: MessageContent::Text("instructions".to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: MessageContent::Parts(vec![
                        ContentPart::Text {
                            text: "what is this?".to_string(),
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: "data:image/jpeg;base64,AAAA".to_string(),
                            },
                        },
                    ]),
                },
            ],
            max_tokens: 1024,
            temperature: 0.2,
            stream: true,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["content"], "instructions");
        assert_eq!(json["messages"][1]["content"][0]["type"], "text");
        assert_eq!(json["messages"][1]["content"][1]["type"], "image_url");
        assert_eq!(
            json["messages"][1]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,AAAA"
        );
        assert_eq!(json["stream"], true);
    }
}
