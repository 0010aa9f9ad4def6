use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use crate::{
    models::{InterestRecord, RegionId, SubscriptionRecord},
    providers::{InterestSource, SubscriptionSource, UpstreamError},
};

/// An in-memory interest and subscription service.
#[derive(Default)]
pub struct InMemoryUpstream {
    interest: Mutex<Vec<InterestRecord>>,
    subscriptions: Mutex<HashMap<String, Vec<SubscriptionRecord>>>,
    unavailable: AtomicBool,
    interest_calls: AtomicUsize,
}

impl InMemoryUpstream {
    /// Creates an empty upstream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares interest in `item_id` for `regions`.
    pub fn with_interest(self, item_id: &str, regions: &[&str]) -> Self {
        self.interest
            .lock()
            .unwrap()
            .push(InterestRecord::new(item_id, regions.iter().map(|r| RegionId::new(*r))));
        self
    }

    /// Subscribes `subscriber` to `item_id` in `region` for `source`.
    pub fn with_subscription(self, item_id: &str, region: &str, source: &str, subscriber: &str) -> Self {
        self.subscriptions
            .lock()
            .unwrap()
            .entry(item_id.to_string())
            .or_default()
            .push(SubscriptionRecord::new(region, source, subscriber));
        self
    }

    /// Makes every subsequent call fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of interest queries answered so far.
    pub fn interest_calls(&self) -> usize {
        self.interest_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), UpstreamError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(UpstreamError::Unavailable("in-memory upstream marked unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl InterestSource for InMemoryUpstream {
    async fn get_active_items(&self, _source: &str) -> Result<Vec<InterestRecord>, UpstreamError> {
        self.interest_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.interest.lock().unwrap().clone())
    }
}

#[async_trait]
impl SubscriptionSource for InMemoryUpstream {
    async fn get_subscriptions(
        &self,
        item_id: &str,
    ) -> Result<Vec<SubscriptionRecord>, UpstreamError> {
        self.check_available()?;
        Ok(self.subscriptions.lock().unwrap().get(item_id).cloned().unwrap_or_default())
    }
}
