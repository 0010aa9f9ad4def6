//! Handler for batch ingestion.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;

use super::{ApiError, ApiState};
use crate::models::{InboundBatch, RegionId};

/// Hands an inbound batch to the dispatch engine and returns the dispatch
/// result.
pub async fn ingest_batch(
    State(state): State<ApiState>,
    Json(batch): Json<InboundBatch>,
) -> Result<impl IntoResponse, ApiError> {
    let region = RegionId::new(batch.region.clone());
    let source = batch.source_or(&state.config.dispatch.default_source);
    tracing::debug!(region = %region, source = %source, items = batch.items.len(), "Batch received.");

    let result = state.engine.dispatch(&region, &batch.items, source).await?;
    state.app_metrics.record_batch(Utc::now()).await;

    Ok((StatusCode::OK, Json(result)))
}
