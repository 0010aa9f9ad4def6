//! Outcome of a single dispatch call.

use serde::{Deserialize, Serialize};

use super::{RegionId, SentNotification};

/// Why a dispatch call short-circuited without looking at items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The region is outside its processing window.
    OutsideWindow,
    /// The batch has the same fingerprint as the last processed one.
    NoChange,
}

impl SkipReason {
    /// Returns the wire name of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::OutsideWindow => "outside_window",
            SkipReason::NoChange => "no_change",
        }
    }
}

/// Summary of what happened to one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    /// The region the batch was dispatched for.
    pub region: RegionId,
    /// The batch source.
    pub source: String,
    /// True if the batch was not evaluated at all.
    pub skipped: bool,
    /// Why the batch was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<SkipReason>,
    /// Number of identified items that were evaluated.
    pub processed_count: usize,
    /// Number of notifications sent.
    pub notified_count: usize,
    /// Number of eligible items suppressed by the cooldown.
    pub cooldown_skipped_count: usize,
    /// Number of items whose notification could not be delivered.
    pub failed_count: usize,
    /// The notifications that were sent, in batch order.
    pub notifications: Vec<SentNotification>,
}

impl DispatchResult {
    /// Creates an empty, non-skipped result.
    pub fn new(region: RegionId, source: impl Into<String>) -> Self {
        Self {
            region,
            source: source.into(),
            skipped: false,
            reason: None,
            processed_count: 0,
            notified_count: 0,
            cooldown_skipped_count: 0,
            failed_count: 0,
            notifications: Vec::new(),
        }
    }

    /// Creates a skipped result.
    pub fn skipped(region: RegionId, source: impl Into<String>, reason: SkipReason) -> Self {
        Self { skipped: true, reason: Some(reason), ..Self::new(region, source) }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_skipped_result_serializes_reason() {
        let result = DispatchResult::skipped(RegionId::new("TR"), "store", SkipReason::NoChange);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["skipped"], json!(true));
        assert_eq!(value["reason"], json!("no_change"));
        assert_eq!(value["notified_count"], json!(0));
    }

    #[test]
    fn test_reason_omitted_when_not_skipped() {
        let result = DispatchResult::new(RegionId::new("TR"), "store");
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("reason").is_none());
        assert_eq!(SkipReason::OutsideWindow.as_str(), "outside_window");
    }
}
