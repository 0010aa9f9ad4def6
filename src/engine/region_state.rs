//! Mutable per-region state and the registry that owns it.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{
    change_detector::Fingerprint,
    cooldown::{CooldownLedger, CooldownPolicy},
};
use crate::models::RegionId;

/// What the engine remembers about one region between dispatches.
#[derive(Debug, Clone, Default)]
pub struct RegionState {
    /// Fingerprint of the last processed batch.
    pub last_fingerprint: Option<Fingerprint>,
    /// When the last dispatch that evaluated items completed.
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Number of dispatches that evaluated items.
    pub check_count: u64,
    /// Notification cooldowns for this region.
    pub cooldown_ledger: CooldownLedger,
}

impl RegionState {
    /// Creates a fresh state whose ledger enforces `policy`.
    pub fn new(policy: CooldownPolicy) -> Self {
        Self { cooldown_ledger: CooldownLedger::new(policy), ..Default::default() }
    }
}

/// Holds the state of one region together with the lock that serializes its
/// dispatches.
///
/// The dispatch lock is held for an entire dispatch. The state lock is only
/// taken for short reads and commits and is never held across an await on an
/// external call, so status readers do not wait behind slow upstreams.
#[derive(Debug, Default)]
pub struct RegionSlot {
    dispatch_lock: Mutex<()>,
    state: RwLock<RegionState>,
}

impl RegionSlot {
    fn new(policy: CooldownPolicy) -> Self {
        Self { dispatch_lock: Mutex::new(()), state: RwLock::new(RegionState::new(policy)) }
    }

    /// Waits until no other dispatch for this region is in flight.
    pub async fn lock_dispatch(&self) -> MutexGuard<'_, ()> {
        self.dispatch_lock.lock().await
    }

    /// Acquires shared access to the state.
    pub async fn read(&self) -> RwLockReadGuard<'_, RegionState> {
        self.state.read().await
    }

    /// Acquires exclusive access to the state.
    pub async fn write(&self) -> RwLockWriteGuard<'_, RegionState> {
        self.state.write().await
    }
}

/// The state of every configured region, created once at startup.
#[derive(Debug, Default)]
pub struct RegionRegistry {
    slots: HashMap<RegionId, Arc<RegionSlot>>,
}

impl RegionRegistry {
    /// Creates one empty state per region.
    pub fn new(regions: impl IntoIterator<Item = RegionId>, policy: CooldownPolicy) -> Self {
        let slots =
            regions.into_iter().map(|id| (id, Arc::new(RegionSlot::new(policy)))).collect();
        Self { slots }
    }

    /// Returns the slot of a configured region.
    pub fn slot(&self, region: &RegionId) -> Option<Arc<RegionSlot>> {
        self.slots.get(region).cloned()
    }

    /// Returns a copy of the current state of a region.
    pub async fn snapshot(&self, region: &RegionId) -> Option<RegionState> {
        let slot = self.slot(region)?;
        let state = slot.read().await;
        Some(state.clone())
    }

    /// Returns the configured region identifiers, sorted.
    pub fn regions(&self) -> Vec<RegionId> {
        let mut ids: Vec<_> = self.slots.keys().cloned().collect();
        ids.sort();
        ids
    }
}
