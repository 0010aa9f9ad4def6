//! The dispatch engine: turns a batch of observed items into notifications.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;

use super::{
    change_detector::ChangeDetector,
    cooldown::CooldownEntry,
    region_state::{RegionRegistry, RegionSlot},
    schedule::RegionSchedule,
};
use crate::{
    models::{
        BatchItem, DispatchResult, Notification, RegionId, SentNotification, SkipReason,
    },
    notification::{ChannelNamer, MessageComposer, NotificationError, NotificationSink},
    providers::GuardedUpstream,
};

/// Default bound for a single sink call.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors returned by [`DispatchEngine::dispatch`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The batch names a region that is not configured.
    #[error("Unknown region: {0}")]
    UnknownRegion(RegionId),
}

/// Read-only view of a region, as exposed by the status endpoints.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RegionStatus {
    /// The region identifier.
    pub region: RegionId,
    /// First hour of the window.
    pub window_start_hour: u8,
    /// Hour at which the window closes.
    pub window_end_hour: u8,
    /// Whether the window is open right now.
    pub in_window: bool,
    /// Check interval in minutes.
    pub check_interval_minutes: u32,
    /// When the region was last checked.
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Number of completed checks.
    pub check_count: u64,
    /// Whether the region is due for a check.
    pub due: bool,
    /// Notifications sent since startup.
    pub notifications_sent: usize,
    /// Items currently held back by the cooldown.
    pub cooldowns: Vec<CooldownEntry>,
}

/// Decides, per region, which items of a batch warrant a notification and
/// sends them.
///
/// Dispatches for the same region are serialized; different regions proceed
/// in parallel.
pub struct DispatchEngine {
    schedule: Arc<RegionSchedule>,
    registry: Arc<RegionRegistry>,
    upstream: GuardedUpstream,
    sink: Arc<dyn NotificationSink>,
    composer: MessageComposer,
    channels: ChannelNamer,
    detector: ChangeDetector,
    send_timeout: Duration,

    /// Notifications sent per region since startup.
    dispatched_notifications: DashMap<RegionId, usize>,
}

impl DispatchEngine {
    /// Creates an engine with the default composer, channel namespace,
    /// fingerprint mode and send timeout.
    pub fn new(
        schedule: Arc<RegionSchedule>,
        registry: Arc<RegionRegistry>,
        upstream: GuardedUpstream,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            schedule,
            registry,
            upstream,
            sink,
            composer: MessageComposer::default(),
            channels: ChannelNamer::default(),
            detector: ChangeDetector::default(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
            dispatched_notifications: DashMap::new(),
        }
    }

    /// Uses `composer` to render titles and bodies.
    pub fn with_composer(mut self, composer: MessageComposer) -> Self {
        self.composer = composer;
        self
    }

    /// Uses `channels` to name notification channels.
    pub fn with_channel_namer(mut self, channels: ChannelNamer) -> Self {
        self.channels = channels;
        self
    }

    /// Uses `detector` to fingerprint batches.
    pub fn with_change_detector(mut self, detector: ChangeDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Bounds every sink call by `timeout`.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// The region schedule the engine gates on.
    pub fn schedule(&self) -> &RegionSchedule {
        &self.schedule
    }

    /// The per-region state owned by the engine.
    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    /// Notifications sent per region since startup.
    pub fn get_dispatched_notifications(&self) -> &DashMap<RegionId, usize> {
        &self.dispatched_notifications
    }

    /// Dispatches a batch at the current time.
    pub async fn dispatch(
        &self,
        region: &RegionId,
        items: &[BatchItem],
        source: &str,
    ) -> Result<DispatchResult, DispatchError> {
        self.dispatch_at(region, items, source, Utc::now()).await
    }

    /// Dispatches a batch as if the current time were `now`.
    pub async fn dispatch_at(
        &self,
        region: &RegionId,
        items: &[BatchItem],
        source: &str,
        now: DateTime<Utc>,
    ) -> Result<DispatchResult, DispatchError> {
        let slot = self.slot(region)?;
        let _dispatch_guard = slot.lock_dispatch().await;

        if !self.schedule.is_in_window(region, now) {
            tracing::debug!(region = %region, "Region is outside its window, skipping batch.");
            return Ok(DispatchResult::skipped(region.clone(), source, SkipReason::OutsideWindow));
        }

        {
            let mut state = slot.write().await;
            let detection = self.detector.detect_change(state.last_fingerprint.as_ref(), items);
            if !detection.changed {
                tracing::debug!(region = %region, fingerprint = %detection.fingerprint, "Batch unchanged, skipping.");
                return Ok(DispatchResult::skipped(region.clone(), source, SkipReason::NoChange));
            }
            tracing::debug!(region = %region, fingerprint = %detection.fingerprint, "Batch changed.");
            state.last_fingerprint = Some(detection.fingerprint);
        }

        let interest = self.upstream.active_items(source).await;
        let mut result = DispatchResult::new(region.clone(), source);

        for item in items {
            let Some(item_id) = item.id() else {
                tracing::debug!(region = %region, "Skipping batch item without an identifier.");
                continue;
            };
            result.processed_count += 1;

            if !interest.iter().any(|record| record.covers(item_id, region)) {
                tracing::debug!(region = %region, item_id = %item_id, "No interest for item in region.");
                continue;
            }

            let may_notify = slot.read().await.cooldown_ledger.may_notify(item_id, now);
            if !may_notify {
                tracing::debug!(region = %region, item_id = %item_id, "Item is cooling down.");
                result.cooldown_skipped_count += 1;
                continue;
            }

            let subscriptions = self.upstream.subscriptions(item_id).await;
            if !subscriptions.iter().any(|sub| sub.matches(region, source)) {
                tracing::debug!(region = %region, item_id = %item_id, source = %source, "No matching subscriptions.");
                continue;
            }

            let channel = self.channels.channel(region, source, item_id);
            let (title, body) = self.composer.compose(region, source, item_id, item);
            let notification =
                Notification { channel, title, body, icon: item.display_icon.clone() };

            match self.send(&notification).await {
                Ok(()) => {
                    slot.write().await.cooldown_ledger.record_notified(item_id, now);
                    tracing::info!(region = %region, item_id = %item_id, channel = %notification.channel, "Notification sent.");
                    result.notified_count += 1;
                    result.notifications.push(SentNotification {
                        item_id: item_id.to_string(),
                        channel: notification.channel,
                        title: notification.title,
                        sent_at: now,
                    });
                }
                Err(e) => {
                    tracing::error!(region = %region, item_id = %item_id, error = %e, "Failed to send notification.");
                    result.failed_count += 1;
                }
            }
        }

        {
            let mut state = slot.write().await;
            state.last_checked_at = Some(now);
            state.check_count += 1;
        }
        *self.dispatched_notifications.entry(region.clone()).or_insert(0) +=
            result.notified_count;

        tracing::debug!(
            region = %region,
            processed = result.processed_count,
            notified = result.notified_count,
            cooldown_skipped = result.cooldown_skipped_count,
            failed = result.failed_count,
            "Batch dispatched."
        );
        Ok(result)
    }

    /// Returns the regions that are in their window and have not been checked
    /// within their interval.
    pub async fn due_regions(&self, now: DateTime<Utc>) -> Vec<RegionId> {
        let mut due = Vec::new();
        for region in self.registry.regions() {
            let Some(slot) = self.registry.slot(&region) else { continue };
            let last_checked_at = slot.read().await.last_checked_at;
            if self.schedule.is_due(&region, last_checked_at, now) {
                due.push(region);
            }
        }
        due
    }

    /// Evicts ledger entries older than each region's retention horizon and
    /// returns how many were removed.
    pub async fn purge_ledgers(&self, now: DateTime<Utc>) -> usize {
        let mut purged = 0;
        for region in self.registry.regions() {
            let Some(slot) = self.registry.slot(&region) else { continue };
            let mut state = slot.write().await;
            let horizon = state.cooldown_ledger.policy().eviction_horizon();
            purged += state.cooldown_ledger.purge_older_than(horizon, now);
        }
        purged
    }

    /// Returns the status of one region, or `None` if it is not configured.
    pub async fn region_status(
        &self,
        region: &RegionId,
        now: DateTime<Utc>,
    ) -> Option<RegionStatus> {
        let config = self.schedule.get(region)?;
        let state = self.registry.snapshot(region).await?;
        Some(RegionStatus {
            region: region.clone(),
            window_start_hour: config.window_start_hour,
            window_end_hour: config.window_end_hour,
            in_window: self.schedule.is_in_window(region, now),
            check_interval_minutes: config.check_interval_minutes,
            last_checked_at: state.last_checked_at,
            check_count: state.check_count,
            due: self.schedule.is_due(region, state.last_checked_at, now),
            notifications_sent: self
                .dispatched_notifications
                .get(region)
                .map(|count| *count)
                .unwrap_or(0),
            cooldowns: state.cooldown_ledger.suppressed(now),
        })
    }

    /// Returns the status of every configured region, sorted by identifier.
    pub async fn statuses(&self, now: DateTime<Utc>) -> Vec<RegionStatus> {
        let mut statuses = Vec::new();
        for region in self.registry.regions() {
            if let Some(status) = self.region_status(&region, now).await {
                statuses.push(status);
            }
        }
        statuses
    }

    fn slot(&self, region: &RegionId) -> Result<Arc<RegionSlot>, DispatchError> {
        if !self.schedule.contains(region) {
            return Err(DispatchError::UnknownRegion(region.clone()));
        }
        self.registry.slot(region).ok_or_else(|| DispatchError::UnknownRegion(region.clone()))
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        match tokio::time::timeout(self.send_timeout, self.sink.send(notification)).await {
            Ok(result) => result,
            Err(_) => Err(NotificationError::Timeout(self.send_timeout)),
        }
    }
}
