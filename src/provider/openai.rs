//! OpenAI-compatible streaming provider
//!
//! Forwards vision requests to any endpoint speaking the OpenAI chat
//! completions protocol and hands back the raw SSE byte stream.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    provider::{ByteStream, ModelProvider, StreamRequest},
};

/// Client for an OpenAI-compatible chat completions API
pub struct OpenAIProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAIProvider {
    /// Create a new provider from configuration
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.openai_api_url.clone(),
            api_key: config.openai_api_key.clone(),
        }
    }

    /// Check if the provider is configured with an API key
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ModelProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn vision_stream(&self, request: &StreamRequest) -> AppResult<ByteStream> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("OPENAI_API_KEY is not configured".to_string())
        })?;

        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, model = %request.model, "Opening provider stream");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamError(format!(
                "Model API error {}: {}",
                status, text
            )));
        }

        info!(model = %request.model, "Provider stream opened");
        Ok(Box::pin(response.bytes_stream()))
    }
}
