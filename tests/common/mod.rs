//! Common test utilities for Prism
//!
//! Shared fixtures and helpers used across integration tests.

#![allow(dead_code)]

use prism::Config;

/// Test configuration constants
pub mod constants {
    /// Default test API key for the model provider
    pub const TEST_API_KEY: &str = "test-provider-api-key";
    /// Default test bearer token for the brain endpoint
    pub const TEST_JWT_TOKEN: &str = "test-session-jwt";
    /// Model used in test requests
    pub const TEST_MODEL: &str = "gpt-4o-mini";
}

/// Build a config pointing the provider at a mock server URL
pub fn test_config(provider_url: &str) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0, // Let OS assign port
        allowed_origins: vec!["http://localhost".to_string()],
        openai_api_url: provider_url.to_string(),
        openai_api_key: Some(constants::TEST_API_KEY.to_string()),
        vision_model: constants::TEST_MODEL.to_string(),
    }
}

/// A 1x1 base64 payload standing in for real image data
pub fn tiny_image_b64() -> &'static str {
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg=="
}

/// Parse an SSE body into the payloads of its `data:` lines
pub fn data_payloads(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|s| s.to_string())
        .collect()
}
