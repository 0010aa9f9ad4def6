//! Region identifiers and their static schedule configuration.

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// Identifier of a configured store region (e.g. `TR`, `eu`).
///
/// The set of valid identifiers is closed: it is whatever the application
/// configuration declares at startup. Anything else is rejected before it
/// reaches the dispatch engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    /// Creates a new region identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RegionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for RegionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

fn default_check_interval_minutes() -> u32 {
    60
}

/// Static configuration of a single region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// The region identifier.
    pub id: RegionId,

    /// First UTC hour (inclusive) of the processing window.
    pub window_start_hour: u8,

    /// UTC hour (exclusive) at which the processing window closes. A value
    /// lower than or equal to `window_start_hour` wraps past midnight.
    pub window_end_hour: u8,

    /// How often the region should be checked while its window is open.
    #[serde(default = "default_check_interval_minutes")]
    pub check_interval_minutes: u32,
}

impl RegionConfig {
    /// Creates a region configuration with the default check interval.
    pub fn new(id: impl Into<RegionId>, window_start_hour: u8, window_end_hour: u8) -> Self {
        Self {
            id: id.into(),
            window_start_hour,
            window_end_hour,
            check_interval_minutes: default_check_interval_minutes(),
        }
    }

    /// Overrides the check interval.
    pub fn with_interval(mut self, minutes: u32) -> Self {
        self.check_interval_minutes = minutes;
        self
    }

    /// Returns true if the given UTC hour falls inside the window.
    pub fn contains_hour(&self, hour: u32) -> bool {
        let start = u32::from(self.window_start_hour);
        let end = u32::from(self.window_end_hour);
        if start <= end { start <= hour && hour < end } else { hour >= start || hour < end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_id_display_and_borrow() {
        let id = RegionId::new("TR");
        assert_eq!(id.to_string(), "TR");
        let borrowed: &str = id.borrow();
        assert_eq!(borrowed, "TR");
    }

    #[test]
    fn test_region_config_deserializes_with_default_interval() {
        let json = r#"{"id":"eu","window_start_hour":0,"window_end_hour":1}"#;
        let config: RegionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.id, RegionId::new("eu"));
        assert_eq!(config.check_interval_minutes, 60);
    }

    #[test]
    fn test_contains_hour_plain_window() {
        let config = RegionConfig::new("TR", 1, 3);
        assert!(!config.contains_hour(0));
        assert!(config.contains_hour(1));
        assert!(config.contains_hour(2));
        assert!(!config.contains_hour(3));
    }

    #[test]
    fn test_contains_hour_wrapping_window() {
        let config = RegionConfig::new("na", 22, 2);
        for hour in [22, 23, 0, 1] {
            assert!(config.contains_hour(hour), "hour {hour} should be in window");
        }
        for hour in 2..22 {
            assert!(!config.contains_hour(hour), "hour {hour} should be outside window");
        }
    }

    #[test]
    fn test_contains_hour_equal_bounds_is_empty() {
        let config = RegionConfig::new("kr", 5, 5);
        assert!((0..24).all(|hour| !config.contains_hour(hour)));
    }
}
