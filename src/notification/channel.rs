//! Deterministic channel naming.

use crate::models::RegionId;

/// The namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "valohub";

/// Builds `{namespace}/{region}/{source}/{item_id}` channel names.
///
/// Names depend only on their inputs so consumers can subscribe to a channel
/// before anything is ever published on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelNamer {
    namespace: String,
}

impl ChannelNamer {
    /// Creates a namer for the given namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into() }
    }

    /// Returns the channel for an item of a region and source.
    pub fn channel(&self, region: &RegionId, source: &str, item_id: &str) -> String {
        format!("{}/{}/{}/{}", self.namespace, region, source, item_id)
    }
}

impl Default for ChannelNamer {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}
