//! Periodic region evaluation.
//!
//! The ticker answers "which regions are due for a check" and publishes them.
//! It never dispatches on its own: batches still arrive through ingestion.
//! Each tick also sweeps the cooldown ledgers so idle regions do not keep
//! stale entries.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::DispatchEngine;
use crate::models::RegionId;

/// Emits due regions on a channel at a fixed interval.
pub struct RegionTicker {
    engine: Arc<DispatchEngine>,
    interval: Duration,
    due_tx: mpsc::Sender<RegionId>,
}

impl RegionTicker {
    /// Creates a ticker that evaluates the engine's regions every `interval`.
    pub fn new(
        engine: Arc<DispatchEngine>,
        interval: Duration,
        due_tx: mpsc::Sender<RegionId>,
    ) -> Self {
        Self { engine, interval, due_tx }
    }

    /// Runs one evaluation at `now`, returning the regions that were due.
    pub async fn tick(&self, now: DateTime<Utc>) -> Vec<RegionId> {
        let purged = self.engine.purge_ledgers(now).await;
        if purged > 0 {
            tracing::debug!(purged, "Evicted expired cooldown entries.");
        }

        let due = self.engine.due_regions(now).await;
        for region in &due {
            tracing::debug!(region = %region, "Region is due for a check.");
            if self.due_tx.send(region.clone()).await.is_err() {
                tracing::warn!(region = %region, "Due-region receiver dropped.");
                break;
            }
        }
        due
    }

    /// Ticks until `cancellation_token` is cancelled.
    pub async fn run(self, cancellation_token: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tracing::info!(interval = ?self.interval, "Region ticker started.");

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    tracing::info!("Region ticker received shutdown signal.");
                    break;
                }
                _ = interval.tick() => {
                    self.tick(Utc::now()).await;
                }
            }
        }
    }
}
