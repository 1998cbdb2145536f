//! Gateway Health API

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::GatewayState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub sessions: usize,
    pub uptime_seconds: u64,
}

/// Handler for `GET /api/health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        service: "platelog",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.provider.name().to_string(),
        sessions: state.sessions.len().await,
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
