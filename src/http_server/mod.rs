//! HTTP server module
//!
//! Exposes batch ingestion (`POST /batches`) and the read-only health and
//! status endpoints.

mod auth;
mod error;
mod ingest;
mod status;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{get, post},
};
pub use error::ApiError;
use serde_json::json;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{config::AppConfig, context::AppMetrics, engine::DispatchEngine};

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct ApiState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// The dispatch engine batches are handed to.
    pub engine: Arc<DispatchEngine>,
    /// Application metrics.
    pub app_metrics: AppMetrics,
}

/// Errors that prevent the HTTP server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured listen address is not a socket address.
    #[error("Invalid server.listen_address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),

    /// Binding or serving failed.
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Builds the router. The ingest route requires a bearer token when an API
/// key is configured.
pub fn router(state: ApiState) -> Router {
    let mut ingest_routes = Router::new().route("/batches", post(ingest::ingest_batch));
    if state.config.server.api_key.is_some() {
        ingest_routes = ingest_routes
            .route_layer(middleware::from_fn_with_state(state.clone(), auth::auth));
    } else {
        tracing::warn!("No API key configured; the ingest endpoint is unauthenticated.");
    }

    Router::new()
        .route("/health", get(health))
        .route("/status", get(status::status))
        .route("/status/{region}", get(status::region_status))
        .merge(ingest_routes)
        .with_state(state)
}

/// Runs the HTTP server until `shutdown` is cancelled.
pub async fn run_server_from_config(
    config: Arc<AppConfig>,
    engine: Arc<DispatchEngine>,
    app_metrics: AppMetrics,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let addr: SocketAddr = config.server.listen_address.parse()?;
    let app = router(ApiState { config, engine, app_metrics });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "HTTP server listening.");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    tracing::info!("HTTP server stopped.");
    Ok(())
}
