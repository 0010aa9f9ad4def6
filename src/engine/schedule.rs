//! Per-region processing windows.

use std::{collections::HashMap, time::Duration};

use chrono::{DateTime, Timelike, Utc};

use crate::models::{RegionConfig, RegionId};

/// Lookup table of region windows and check intervals.
///
/// The schedule is immutable once built. Unknown regions are reported as being
/// outside their window rather than as an error, so callers fail closed.
#[derive(Debug, Clone, Default)]
pub struct RegionSchedule {
    regions: HashMap<RegionId, RegionConfig>,
}

impl RegionSchedule {
    /// Builds a schedule from the configured regions.
    pub fn new(regions: impl IntoIterator<Item = RegionConfig>) -> Self {
        Self { regions: regions.into_iter().map(|r| (r.id.clone(), r)).collect() }
    }

    /// Returns true if `region` is inside its window at `now`.
    pub fn is_in_window(&self, region: &RegionId, now: DateTime<Utc>) -> bool {
        self.regions.get(region).is_some_and(|config| config.contains_hour(now.hour()))
    }

    /// Returns the configuration of a region.
    pub fn get(&self, region: &RegionId) -> Option<&RegionConfig> {
        self.regions.get(region)
    }

    /// Returns true if the region is configured.
    pub fn contains(&self, region: &RegionId) -> bool {
        self.regions.contains_key(region)
    }

    /// Returns the check interval of a region.
    pub fn interval(&self, region: &RegionId) -> Option<Duration> {
        self.regions
            .get(region)
            .map(|config| Duration::from_secs(u64::from(config.check_interval_minutes) * 60))
    }

    /// Returns true if `region` is in its window and has not been checked
    /// within its interval.
    pub fn is_due(
        &self,
        region: &RegionId,
        last_checked_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(interval) = self.interval(region) else { return false };
        if !self.is_in_window(region, now) {
            return false;
        }
        match last_checked_at {
            None => true,
            Some(last) => (now - last).to_std().is_ok_and(|elapsed| elapsed >= interval),
        }
    }

    /// Returns all configured regions, sorted by identifier.
    pub fn regions(&self) -> Vec<&RegionConfig> {
        let mut regions: Vec<_> = self.regions.values().collect();
        regions.sort_by(|a, b| a.id.cmp(&b.id));
        regions
    }
}
