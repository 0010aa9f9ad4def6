//! Inbound store snapshots.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The source a batch belongs to when the inbound event does not name one.
pub const DEFAULT_SOURCE: &str = "store";

/// A single entry of a store snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    /// The item identifier. Entries without one are ignored by the engine.
    #[serde(rename = "itemId", alias = "item_id", default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,

    /// Human readable name of the item, if the sender knows it.
    #[serde(
        rename = "displayName",
        alias = "display_name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,

    /// Icon URL shown alongside the notification.
    #[serde(
        rename = "displayIcon",
        alias = "icon",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_icon: Option<String>,

    /// Any other metadata carried by the snapshot entry.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl BatchItem {
    /// Creates an item with only an identifier.
    pub fn new(item_id: impl Into<String>) -> Self {
        Self { item_id: Some(item_id.into()), ..Default::default() }
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets the display icon.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.display_icon = Some(icon.into());
        self
    }

    /// Returns the identifier, treating an empty string as missing.
    pub fn id(&self) -> Option<&str> {
        self.item_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Returns the display name, falling back to the raw identifier.
    pub fn label(&self) -> Option<&str> {
        self.display_name.as_deref().filter(|name| !name.is_empty()).or_else(|| self.id())
    }
}

/// An inbound snapshot for one region, as delivered by the ingest transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundBatch {
    /// The region the snapshot was taken for.
    pub region: String,

    /// The snapshot source (e.g. `store`, `nightmarket`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// The snapshot entries, in the order they were observed.
    pub items: Vec<BatchItem>,
}

impl InboundBatch {
    /// Returns the batch source, or `default` when the batch names none.
    pub fn source_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.source.as_deref() {
            Some(source) if !source.is_empty() => source,
            _ => default,
        }
    }
}
