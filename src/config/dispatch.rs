use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use super::{
    deserialize_duration_from_ms, deserialize_duration_from_seconds, serialize_duration_to_ms,
    serialize_duration_to_seconds,
};
use crate::{
    engine::{CooldownPolicy, FingerprintMode},
    models::{DEFAULT_SOURCE, NotificationMessage},
    notification::{DEFAULT_BODY_TEMPLATE, DEFAULT_NAMESPACE, DEFAULT_TITLE_TEMPLATE},
};

fn default_cooldown() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_retention_multiplier() -> u32 {
    2
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

fn default_call_timeout() -> Duration {
    Duration::from_millis(5000)
}

fn default_message() -> NotificationMessage {
    NotificationMessage {
        title: DEFAULT_TITLE_TEMPLATE.to_string(),
        body: DEFAULT_BODY_TEMPLATE.to_string(),
    }
}

/// Error returned when the configured cooldown cannot be represented.
#[derive(Debug, thiserror::Error)]
#[error("cooldown of {0:?} is out of range")]
pub struct CooldownRangeError(pub Duration);

/// Tuning of the dispatch engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispatchConfig {
    /// Minimum time between two notifications for the same item in a region.
    #[serde(
        default = "default_cooldown",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub cooldown_secs: Duration,

    /// Ledger entries older than `cooldown * retention_multiplier` are
    /// evicted.
    #[serde(default = "default_retention_multiplier")]
    pub retention_multiplier: u32,

    /// Prefix of every notification channel.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Source used when an inbound batch does not name one.
    #[serde(default = "default_source")]
    pub default_source: String,

    /// Upper bound for every call to the upstream service or the sink.
    #[serde(
        default = "default_call_timeout",
        deserialize_with = "deserialize_duration_from_ms",
        serialize_with = "serialize_duration_to_ms"
    )]
    pub call_timeout_ms: Duration,

    /// What goes into a batch fingerprint.
    #[serde(default)]
    pub fingerprint_mode: FingerprintMode,

    /// Title and body templates.
    #[serde(default = "default_message")]
    pub message: NotificationMessage,
}

impl DispatchConfig {
    /// Builds the cooldown policy described by this configuration.
    pub fn cooldown_policy(&self) -> Result<CooldownPolicy, CooldownRangeError> {
        let out_of_range = || CooldownRangeError(self.cooldown_secs);
        let cooldown = TimeDelta::from_std(self.cooldown_secs).map_err(|_| out_of_range())?;
        let retention = i32::try_from(self.retention_multiplier)
            .ok()
            .and_then(|multiplier| cooldown.checked_mul(multiplier))
            .ok_or_else(out_of_range)?;
        Ok(CooldownPolicy { cooldown, retention })
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown(),
            retention_multiplier: default_retention_multiplier(),
            namespace: default_namespace(),
            default_source: default_source(),
            call_timeout_ms: default_call_timeout(),
            fingerprint_mode: FingerprintMode::default(),
            message: default_message(),
        }
    }
}
