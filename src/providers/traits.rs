//! Capability interfaces for the upstream interest and subscription services.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::models::{InterestRecord, SubscriptionRecord};

/// Errors raised by upstream adapters.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The request could not be sent or retries were exhausted.
    #[error("Upstream request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),

    /// The upstream answered with a non-success status.
    #[error("Upstream returned status {0}")]
    Status(u16),

    /// The upstream response could not be decoded.
    #[error("Failed to decode upstream response: {0}")]
    Decode(#[from] reqwest::Error),

    /// The request URL could not be built.
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),

    /// The upstream did not answer within the configured timeout.
    #[error("Upstream call timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Any other adapter-specific failure.
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),
}

/// Answers "which items currently have interested subscribers".
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InterestSource: Send + Sync {
    /// Returns the items with active interest for the given source.
    async fn get_active_items(&self, source: &str) -> Result<Vec<InterestRecord>, UpstreamError>;
}

/// Answers "who is subscribed to a given item".
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubscriptionSource: Send + Sync {
    /// Returns every subscription for the given item, across regions.
    async fn get_subscriptions(
        &self,
        item_id: &str,
    ) -> Result<Vec<SubscriptionRecord>, UpstreamError>;
}
