//! Configuration module for Valohub.

mod app_config;
mod dispatch;
mod endpoints;
mod helpers;
mod http_retry;
mod server;

pub use app_config::{AppConfig, AppConfigBuilder, ConfigValidationError};
pub use dispatch::{CooldownRangeError, DispatchConfig};
pub use endpoints::{EndpointConnection, RelayConfig, UpstreamConfig};
pub use helpers::{
    deserialize_duration_from_ms, deserialize_duration_from_seconds, deserialize_optional_url,
    deserialize_url, serialize_duration_to_ms, serialize_duration_to_seconds,
};
pub use http_retry::{HttpRetryConfig, JitterSetting};
pub use server::ServerConfig;
