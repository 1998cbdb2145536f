//! Main HTTP Gateway Server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use platelog_core::VisionProvider;
use platelog_logging::{EventLogger, SessionEvent};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument};

use crate::health_api;
use crate::session_registry::SessionRegistry;
use crate::sessions_api;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub provider: Arc<dyn VisionProvider>,
    pub sessions: SessionRegistry,
    pub started_at: Instant,
    pub max_upload_bytes: usize,
}

impl GatewayState {
    pub fn new(provider: Arc<dyn VisionProvider>, max_upload_bytes: usize) -> Self {
        Self {
            provider,
            sessions: SessionRegistry::new(),
            started_at: Instant::now(),
            max_upload_bytes,
        }
    }
}

/// Build the Axum router with all API routes.
pub fn build_router(state: GatewayState) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route("/api/health", get(health_api::get_health))
        .route("/api/sessions", post(sessions_api::create_session))
        .route(
            "/api/sessions/:id",
            get(sessions_api::get_session).delete(sessions_api::end_session),
        )
        .route("/api/sessions/:id/detect", post(sessions_api::detect))
        .route("/api/sessions/:id/export", get(sessions_api::export))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Starts the HTTP server and the idle-session reaper; returns on Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(
    addr: SocketAddr,
    state: GatewayState,
    session_idle: Duration,
) -> Result<()> {
    let reaper = tokio::spawn(reap_idle_sessions(state.sessions.clone(), session_idle));
    let app = build_router(state);

    info!("Gateway HTTP server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reaper.abort();
    info!("Gateway stopped");
    Ok(())
}

async fn reap_idle_sessions(sessions: SessionRegistry, max_idle: Duration) {
    let period = (max_idle / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        end_idle_sessions(&sessions, max_idle).await;
    }
}

/// Reap idle sessions, logging each one as ended. Returns how many ended.
async fn end_idle_sessions(sessions: &SessionRegistry, max_idle: Duration) -> usize {
    let reaped = sessions.reap_idle(max_idle).await;
    for (session_id, records) in &reaped {
        EventLogger::log_event(session_id, SessionEvent::Ended { records: *records });
    }
    reaped.len()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
