//! Liveness endpoint
//!
//! `GET /healthz` answers `{ok: true}` for load balancers and uptime
//! monitors. No auth, no dependency checks — the relay has no stateful
//! dependencies worth probing.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthzResponse {
    pub ok: bool,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: String,
}

/// Liveness check endpoint
pub async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthzResponse>) {
    (
        StatusCode::OK,
        Json(HealthzResponse {
            ok: true,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}
