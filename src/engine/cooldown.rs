//! Per-region notification cooldown bookkeeping.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// How long a notification blocks the next one, and how long entries are
/// kept around before being evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    /// Minimum time between two notifications for the same item.
    pub cooldown: TimeDelta,
    /// Entries older than this are purged from the ledger.
    pub retention: TimeDelta,
}

impl CooldownPolicy {
    /// Creates a policy whose retention horizon is twice the cooldown.
    pub fn new(cooldown: TimeDelta) -> Self {
        Self { cooldown, retention: cooldown * 2 }
    }

    /// Overrides the retention horizon.
    pub fn with_retention(mut self, retention: TimeDelta) -> Self {
        self.retention = retention;
        self
    }

    /// The age past which an entry may be evicted. Never shorter than the
    /// cooldown, so an entry that still blocks a notification is kept.
    pub fn eviction_horizon(&self) -> TimeDelta {
        self.retention.max(self.cooldown)
    }
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self::new(TimeDelta::hours(24))
    }
}

/// An item that is currently suppressed by the cooldown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CooldownEntry {
    /// The suppressed item.
    pub item_id: String,
    /// When the last notification for the item was sent.
    pub notified_at: DateTime<Utc>,
    /// When the item becomes eligible again.
    pub expires_at: DateTime<Utc>,
}

/// Item id to last-notification timestamp, for a single region.
#[derive(Debug, Clone, Default)]
pub struct CooldownLedger {
    policy: CooldownPolicy,
    entries: HashMap<String, DateTime<Utc>>,
}

impl CooldownLedger {
    /// Creates an empty ledger.
    pub fn new(policy: CooldownPolicy) -> Self {
        Self { policy, entries: HashMap::new() }
    }

    /// Returns the policy the ledger enforces.
    pub fn policy(&self) -> CooldownPolicy {
        self.policy
    }

    /// Returns true if a notification for `item_id` may be sent at `now`.
    pub fn may_notify(&self, item_id: &str, now: DateTime<Utc>) -> bool {
        match self.entries.get(item_id) {
            None => true,
            Some(last) => now.signed_duration_since(*last) >= self.policy.cooldown,
        }
    }

    /// Records a notification for `item_id` at `now`, then evicts entries
    /// older than the eviction horizon.
    pub fn record_notified(&mut self, item_id: &str, now: DateTime<Utc>) {
        self.entries.insert(item_id.to_string(), now);
        let purged = self.purge_older_than(self.policy.eviction_horizon(), now);
        if purged > 0 {
            tracing::debug!(purged, "Evicted expired cooldown entries.");
        }
    }

    /// Removes every entry recorded more than `horizon` before `now` and
    /// returns how many were removed.
    pub fn purge_older_than(&mut self, horizon: TimeDelta, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, notified_at| now.signed_duration_since(*notified_at) <= horizon);
        before - self.entries.len()
    }

    /// Returns the timestamp of the last notification for `item_id`.
    pub fn last_notified(&self, item_id: &str) -> Option<DateTime<Utc>> {
        self.entries.get(item_id).copied()
    }

    /// Lists the items still inside their cooldown at `now`, earliest expiry
    /// first.
    pub fn suppressed(&self, now: DateTime<Utc>) -> Vec<CooldownEntry> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .filter(|(item_id, _)| !self.may_notify(item_id, now))
            .map(|(item_id, notified_at)| CooldownEntry {
                item_id: item_id.clone(),
                notified_at: *notified_at,
                expires_at: *notified_at + self.policy.cooldown,
            })
            .collect();
        entries.sort_by(|a, b| a.expires_at.cmp(&b.expires_at).then(a.item_id.cmp(&b.item_id)));
        entries
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the ledger holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
