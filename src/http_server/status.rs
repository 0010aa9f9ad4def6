//! Represents the `/status` endpoint handlers and response structures.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ApiError, ApiState};
use crate::{engine::RegionStatus, models::RegionId};

/// Represents the response from the `/status` endpoint.
#[derive(Debug, Serialize, Clone)]
pub struct StatusResponse {
    /// The version of the application.
    pub version: String,
    /// The uptime of the application in seconds.
    pub uptime_secs: u64,
    /// Number of batches accepted since startup.
    pub batches_received: u64,
    /// When the last batch was accepted.
    pub last_batch_at: Option<DateTime<Utc>>,
    /// Per region, how many ticker rounds found it due.
    pub due_signals: BTreeMap<RegionId, u64>,
    /// Status of every configured region.
    pub regions: Vec<RegionStatus>,
}

/// Retrieves application status and the state of every region.
pub async fn status(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let regions = state.engine.statuses(Utc::now()).await;
    let metrics = state.app_metrics.metrics.read().await;
    let response = StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: metrics.start_time.elapsed().as_secs(),
        batches_received: metrics.batches_received,
        last_batch_at: metrics.last_batch_at,
        due_signals: metrics.due_signals.clone(),
        regions,
    };
    Ok((StatusCode::OK, Json(response)))
}

/// Retrieves the state of a single region.
pub async fn region_status(
    State(state): State<ApiState>,
    Path(region): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let region_id = RegionId::new(region);
    let status = state
        .engine
        .region_status(&region_id, Utc::now())
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Unknown region: {region_id}")))?;
    Ok((StatusCode::OK, Json(status)))
}
