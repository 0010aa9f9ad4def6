use std::{collections::HashMap, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;

use super::{
    deserialize_duration_from_ms, deserialize_duration_from_seconds, deserialize_optional_url,
    serialize_duration_to_ms, serialize_duration_to_seconds,
};

fn default_connect_timeout() -> Duration {
    Duration::from_millis(2000)
}

fn default_idle_timeout() -> Duration {
    Duration::from_secs(90)
}

fn default_max_idle() -> usize {
    4
}

/// Connection tuning of the HTTP client talking to one endpoint.
///
/// The upstream service and the push relay each get their own client, so a
/// slow relay never exhausts the connections used for interest lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EndpointConnection {
    /// Upper bound for establishing a TCP/TLS connection.
    #[serde(
        default = "default_connect_timeout",
        deserialize_with = "deserialize_duration_from_ms",
        serialize_with = "serialize_duration_to_ms"
    )]
    pub connect_timeout_ms: Duration,

    /// How long an unused keep-alive connection is kept open.
    #[serde(
        default = "default_idle_timeout",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub idle_timeout_secs: Duration,

    /// Keep-alive connections kept per host.
    #[serde(default = "default_max_idle")]
    pub max_idle: usize,
}

impl Default for EndpointConnection {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_idle: default_max_idle(),
        }
    }
}

/// Where interest and subscription records are fetched from.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream service. Required to run the service.
    #[serde(default, deserialize_with = "deserialize_optional_url")]
    pub base_url: Option<Url>,

    /// Optional bearer token sent with every upstream request.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Connection tuning. Upstream reads are retried with `http_retry_config`.
    #[serde(default)]
    pub connection: EndpointConnection,
}

/// Where rendered notifications are delivered.
///
/// Relay requests are never retried: a POST that timed out may already have
/// been delivered, and a retry would push the same notification twice.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RelayConfig {
    /// URL of the push relay. Notifications are printed to stdout when unset.
    #[serde(default, deserialize_with = "deserialize_optional_url")]
    pub url: Option<Url>,

    /// Secret used to sign relay payloads.
    #[serde(default)]
    pub secret: Option<String>,

    /// Extra headers attached to every relay request.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Connection tuning.
    #[serde(default)]
    pub connection: EndpointConnection,
}
