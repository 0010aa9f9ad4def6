//! Fail-open wrapper around the upstream sources.
//!
//! The dispatch engine never sees an upstream error: every call is bounded by
//! a timeout and any failure degrades to an empty answer, with a warning in
//! the logs.

use std::{future::Future, sync::Arc, time::Duration};

use super::traits::{InterestSource, SubscriptionSource, UpstreamError};
use crate::models::{InterestRecord, SubscriptionRecord};

/// Interest and subscription sources with the fail-open contract applied.
#[derive(Clone)]
pub struct GuardedUpstream {
    interest: Arc<dyn InterestSource>,
    subscriptions: Arc<dyn SubscriptionSource>,
    timeout: Duration,
}

impl GuardedUpstream {
    /// Wraps the given sources, bounding each call by `timeout`.
    pub fn new(
        interest: Arc<dyn InterestSource>,
        subscriptions: Arc<dyn SubscriptionSource>,
        timeout: Duration,
    ) -> Self {
        Self { interest, subscriptions, timeout }
    }

    /// Returns the active interest records for `source`, or nothing if the
    /// upstream is unavailable.
    pub async fn active_items(&self, source: &str) -> Vec<InterestRecord> {
        self.fail_open("active items", source, self.interest.get_active_items(source)).await
    }

    /// Returns the subscriptions of `item_id`, or nothing if the upstream is
    /// unavailable.
    pub async fn subscriptions(&self, item_id: &str) -> Vec<SubscriptionRecord> {
        self.fail_open("subscriptions", item_id, self.subscriptions.get_subscriptions(item_id))
            .await
    }

    async fn fail_open<T, F>(&self, what: &str, key: &str, call: F) -> Vec<T>
    where
        F: Future<Output = Result<Vec<T>, UpstreamError>>,
    {
        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to fetch {}; treating as empty.", what);
                Vec::new()
            }
        }
    }
}
