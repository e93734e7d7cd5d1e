//! Mock infrastructure for testing external services
//!
//! This module provides wiremock-based mock servers for the relay's
//! external dependencies:
//! - Model provider API (streaming chat completions)
//! - Brain endpoint (relay-grammar SSE, consumed by the streaming client)
//!
//! All mocks are reusable across test files and support success, error,
//! and slow-response scenarios.

#![allow(dead_code)]

pub mod brain;
pub mod model_api;

pub use brain::MockBrain;
pub use model_api::MockModelApi;
