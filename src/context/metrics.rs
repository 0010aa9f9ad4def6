use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::RegionId;

/// A struct to hold application metrics.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// The time the application started.
    pub start_time: tokio::time::Instant,
    /// Number of batches accepted by the ingest endpoint.
    pub batches_received: u64,
    /// When the last batch was accepted.
    pub last_batch_at: Option<DateTime<Utc>>,
    /// Per region, how many ticker rounds found it due without a fresh batch.
    pub due_signals: BTreeMap<RegionId, u64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            start_time: tokio::time::Instant::now(),
            batches_received: 0,
            last_batch_at: None,
            due_signals: BTreeMap::new(),
        }
    }
}

/// Shared application metrics for the HTTP server.
#[derive(Clone, Default)]
pub struct AppMetrics {
    /// Shared metrics.
    pub metrics: Arc<RwLock<Metrics>>,
}

impl AppMetrics {
    /// Records an accepted batch.
    pub async fn record_batch(&self, at: DateTime<Utc>) {
        let mut metrics = self.metrics.write().await;
        metrics.batches_received += 1;
        metrics.last_batch_at = Some(at);
    }

    /// Records that the ticker found `region` due for a check.
    pub async fn record_due(&self, region: &RegionId) {
        let mut metrics = self.metrics.write().await;
        *metrics.due_signals.entry(region.clone()).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_batch() {
        let app_metrics = AppMetrics::default();
        let now = Utc::now();
        app_metrics.record_batch(now).await;
        app_metrics.record_batch(now).await;

        let metrics = app_metrics.metrics.read().await;
        assert_eq!(metrics.batches_received, 2);
        assert_eq!(metrics.last_batch_at, Some(now));
    }

    #[tokio::test]
    async fn test_record_due_counts_per_region() {
        let app_metrics = AppMetrics::default();
        let tr = RegionId::new("TR");
        app_metrics.record_due(&tr).await;
        app_metrics.record_due(&tr).await;
        app_metrics.record_due(&RegionId::new("eu")).await;

        let metrics = app_metrics.metrics.read().await;
        assert_eq!(metrics.due_signals.get(&tr), Some(&2));
        assert_eq!(metrics.due_signals.get("eu"), Some(&1));
    }
}
