//! HTTP routes for Prism
//!
//! This module defines all HTTP endpoints exposed by the relay.

pub mod health;
pub mod vision;

use std::sync::Arc;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/api/vision-stream", post(vision::vision_stream))
        .route("/healthz", get(health::healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS policy: an origin is admitted when it starts with any configured
/// prefix. Requests without an Origin header (curl, server-to-server) are
/// untouched by the layer. Credentials stay off.
fn cors_layer(prefixes: &[String]) -> CorsLayer {
    let prefixes = prefixes.to_vec();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin
                .to_str()
                .map(|o| prefixes.iter().any(|p| o.starts_with(p.as_str())))
                .unwrap_or(false)
        }))
        .allow_methods([Method::POST, Method::OPTIONS, Method::GET])
        .allow_headers(Any)
}
