//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload containing the server
//! version, build commit, uptime, relay settings, and cumulative
//! request statistics.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub commit: String,
    pub uptime_seconds: u64,
    pub relay: RelayHealth,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct RelayHealth {
    pub path: String,
    pub upstream_timeout_ms: Option<u64>,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub relayed: u64,
    pub failed: u64,
    pub rejected: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: env!("CORS_RELAY_GIT_SHORT").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        relay: RelayHealth {
            path: state.relay_path.clone(),
            upstream_timeout_ms: state.upstream_timeout_ms,
        },
        stats: StatsResponse {
            relayed: state.stats.relayed.load(Ordering::Relaxed),
            failed: state.stats.failed.load(Ordering::Relaxed),
            rejected: state.stats.rejected.load(Ordering::Relaxed),
        },
    })
}
