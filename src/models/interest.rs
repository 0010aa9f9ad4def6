//! Records supplied by the upstream interest and subscription services.

use serde::{Deserialize, Serialize};

use super::RegionId;

/// An item that currently has interested subscribers in some regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRecord {
    /// The item identifier.
    #[serde(rename = "itemId", alias = "item_id")]
    pub item_id: String,

    /// Regions where the item is relevant.
    #[serde(default)]
    pub regions: Vec<RegionId>,
}

impl InterestRecord {
    /// Creates a new interest record.
    pub fn new(item_id: impl Into<String>, regions: impl IntoIterator<Item = RegionId>) -> Self {
        Self { item_id: item_id.into(), regions: regions.into_iter().collect() }
    }

    /// Returns true if this record covers the given item in the given region.
    pub fn covers(&self, item_id: &str, region: &RegionId) -> bool {
        self.item_id == item_id && self.regions.contains(region)
    }
}

/// One interested party for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Region the subscriber watches.
    pub region: RegionId,

    /// Source the subscriber watches.
    pub source: String,

    /// Opaque reference to the subscriber.
    #[serde(rename = "subscriberRef", alias = "subscriber_ref", default)]
    pub subscriber_ref: String,
}

impl SubscriptionRecord {
    /// Creates a new subscription record.
    pub fn new(
        region: impl Into<RegionId>,
        source: impl Into<String>,
        subscriber_ref: impl Into<String>,
    ) -> Self {
        Self { region: region.into(), source: source.into(), subscriber_ref: subscriber_ref.into() }
    }

    /// Returns true if the subscription targets the given region and source.
    pub fn matches(&self, region: &RegionId, source: &str) -> bool {
        &self.region == region && self.source == source
    }
}
