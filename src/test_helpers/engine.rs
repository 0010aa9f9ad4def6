use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeZone, Utc};

use crate::{
    config::{AppConfig, DispatchConfig},
    context::build_engine,
    engine::DispatchEngine,
    models::RegionConfig,
    notification::NotificationSink,
    providers::{GuardedUpstream, InterestSource, SubscriptionSource},
};

/// Returns a fixed UTC timestamp on 2025-03-14 at the given hour and minute.
pub fn test_time(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, hour, minute, 0).unwrap()
}

/// A builder for creating `DispatchEngine` instances for testing.
pub struct EngineBuilder {
    config: AppConfig,
    upstream_timeout: Duration,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self { config: AppConfig::default(), upstream_timeout: Duration::from_millis(500) }
    }
}

impl EngineBuilder {
    /// Creates a builder with no regions and the default dispatch settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a region.
    pub fn region(mut self, id: &str, window_start_hour: u8, window_end_hour: u8) -> Self {
        self.config.regions.push(RegionConfig::new(id, window_start_hour, window_end_hour));
        self
    }

    /// Replaces the dispatch settings.
    pub fn dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.config.dispatch = dispatch;
        self
    }

    /// Bounds upstream calls by `timeout`.
    pub fn upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Returns the configuration the engine will be built from.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Builds the engine over the given adapters.
    pub fn build(
        self,
        interest: Arc<dyn InterestSource>,
        subscriptions: Arc<dyn SubscriptionSource>,
        sink: Arc<dyn NotificationSink>,
    ) -> DispatchEngine {
        let upstream = GuardedUpstream::new(interest, subscriptions, self.upstream_timeout);
        build_engine(&self.config, upstream, sink).unwrap()
    }
}
