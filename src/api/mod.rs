//! HTTP API for health checks, status lookups, and monitoring

use crate::config::ApiConfig;
use crate::metrics;
use crate::status::StatusReconciler;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<StatusReconciler>,
}

pub fn router(reconciler: Arc<StatusReconciler>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/status/:address", get(get_status))
        .route("/metrics", get(get_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { reconciler })
}

/// Run the HTTP API server
pub async fn run_server(config: ApiConfig, reconciler: Arc<StatusReconciler>) -> std::io::Result<()> {
    let app = router(reconciler);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}

/// Health check endpoint - basic liveness
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Plain-text status report for an initiator address
async fn get_status(State(state): State<AppState>, Path(address): Path<String>) -> impl IntoResponse {
    let report = state.reconciler.transaction_status(&address).await;
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], report)
}

async fn get_metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}

// Response types

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
