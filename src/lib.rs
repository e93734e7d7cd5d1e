//! Prism - streaming AI response relay
//!
//! This library provides both sides of the relay pipeline: an HTTP server
//! that proxies multimodal prompts to a streaming model API and re-emits a
//! normalized SSE stream (with an early structured-JSON side channel), and
//! a streaming client that consumes that SSE grammar with per-stream and
//! bulk cancellation.

pub mod client;
pub mod config;
pub mod error;
pub mod prompt;
pub mod provider;
pub mod routes;
pub mod streaming;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

pub use crate::client::{SessionProvider, StaticSession, StreamingClient};
pub use crate::config::Config;
pub use crate::error::{AppError, AppResult};
pub use crate::provider::{ModelProvider, OpenAIProvider};
pub use crate::streaming::{scanner::JsonScanner, RelayFrame, SseLineBuffer};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub start_time: Instant,
    /// Model provider the relay forwards vision requests to
    pub provider: Arc<dyn ModelProvider>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        // Connection pooling matters here: every relay request opens a
        // long-lived streaming connection to the provider
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .timeout(std::time::Duration::from_secs(300))
            .build()?;

        let provider: Arc<dyn ModelProvider> =
            Arc::new(OpenAIProvider::new(http_client.clone(), &config));

        Ok(Self {
            config,
            http_client,
            start_time: Instant::now(),
            provider,
        })
    }

    /// Create application state for testing with a mocked provider.
    ///
    /// The provider typically points at a wiremock server; everything else
    /// is real, so integration tests exercise the actual router and relay
    /// loop.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn new_for_testing(config: Config, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
            start_time: Instant::now(),
            provider,
        }
    }
}
