use std::{collections::HashSet, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use super::{
    DispatchConfig, HttpRetryConfig, RelayConfig, ServerConfig, UpstreamConfig,
    deserialize_duration_from_seconds, dispatch::CooldownRangeError,
};
use crate::{
    models::{RegionConfig, RegionId},
    notification::{MessageComposer, TemplateServiceError},
};

/// Provides the default value for shutdown_timeout.
fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Provides the default value for tick_interval_secs.
fn default_tick_interval() -> Duration {
    Duration::from_secs(60)
}

/// Reasons a loaded configuration is rejected at startup.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    /// A window bound is not a valid hour of the day.
    #[error("region {region}: window hour {hour} is outside 0..=23")]
    InvalidWindowHour {
        /// The offending region.
        region: RegionId,
        /// The offending hour.
        hour: u8,
    },

    /// A region has a zero check interval.
    #[error("region {0}: check_interval_minutes must be greater than zero")]
    ZeroInterval(RegionId),

    /// The same region id is declared twice.
    #[error("region {0} is declared more than once")]
    DuplicateRegion(RegionId),

    /// The channel namespace is empty.
    #[error("dispatch.namespace must not be empty")]
    EmptyNamespace,

    /// The default source is empty.
    #[error("dispatch.default_source must not be empty")]
    EmptyDefaultSource,

    /// Ledger entries would be evicted before their cooldown ends.
    #[error("dispatch.retention_multiplier must be at least 1")]
    ZeroRetentionMultiplier,

    /// The call timeout is zero.
    #[error("dispatch.call_timeout_ms must be greater than zero")]
    ZeroCallTimeout,

    /// The cooldown cannot be represented.
    #[error(transparent)]
    Cooldown(#[from] CooldownRangeError),

    /// A message template does not compile.
    #[error("invalid message template: {0}")]
    Template(#[from] TemplateServiceError),

    /// A required setting is missing.
    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

/// Application configuration for Valohub.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// The closed set of regions handled by this instance.
    #[serde(default)]
    pub regions: Vec<RegionConfig>,

    /// Dispatch engine tuning.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Interest and subscription service.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Push relay.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Retry policy of upstream reads. Relay deliveries are never retried.
    #[serde(default)]
    pub http_retry_config: HttpRetryConfig,

    /// How often the region ticker evaluates which regions are due.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_tick_interval"
    )]
    pub tick_interval_secs: Duration,

    /// The maximum time in seconds to wait for graceful shutdown.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_shutdown_timeout"
    )]
    pub shutdown_timeout: Duration,
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading from the configuration directory.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/app.yaml", config_dir_str)))
            .add_source(Environment::with_prefix("VALOHUB").separator("__"))
            .build()?;
        s.try_deserialize()
    }

    /// Checks the invariants the rest of the application relies on.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let mut seen = HashSet::new();
        for region in &self.regions {
            for hour in [region.window_start_hour, region.window_end_hour] {
                if hour > 23 {
                    return Err(ConfigValidationError::InvalidWindowHour {
                        region: region.id.clone(),
                        hour,
                    });
                }
            }
            if region.check_interval_minutes == 0 {
                return Err(ConfigValidationError::ZeroInterval(region.id.clone()));
            }
            if !seen.insert(&region.id) {
                return Err(ConfigValidationError::DuplicateRegion(region.id.clone()));
            }
        }

        if self.dispatch.namespace.trim().is_empty() {
            return Err(ConfigValidationError::EmptyNamespace);
        }
        if self.dispatch.default_source.trim().is_empty() {
            return Err(ConfigValidationError::EmptyDefaultSource);
        }
        if self.dispatch.retention_multiplier < 1 {
            return Err(ConfigValidationError::ZeroRetentionMultiplier);
        }
        if self.dispatch.call_timeout_ms.is_zero() {
            return Err(ConfigValidationError::ZeroCallTimeout);
        }
        self.dispatch.cooldown_policy()?;
        MessageComposer::new(self.dispatch.message.clone()).validate()?;
        Ok(())
    }

    /// Validates the configuration and additionally requires an upstream
    /// service, which every command that dispatches needs.
    pub fn validate_for_dispatch(&self) -> Result<(), ConfigValidationError> {
        self.validate()?;
        if self.upstream.base_url.is_none() {
            return Err(ConfigValidationError::Missing("upstream.base_url"));
        }
        Ok(())
    }

    /// Creates a new `AppConfigBuilder`.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// A builder for creating `AppConfig` instances, mostly in tests.
#[derive(Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Adds a region.
    pub fn region(mut self, region: RegionConfig) -> Self {
        self.config.regions.push(region);
        self
    }

    /// Replaces the dispatch configuration.
    pub fn dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.config.dispatch = dispatch;
        self
    }

    /// Sets the upstream base URL.
    pub fn upstream_url(mut self, url: url::Url) -> Self {
        self.config.upstream.base_url = Some(url);
        self
    }

    /// Sets the relay URL.
    pub fn relay_url(mut self, url: url::Url) -> Self {
        self.config.relay.url = Some(url);
        self
    }

    /// Sets the server listen address.
    pub fn listen_address(mut self, address: &str) -> Self {
        self.config.server.listen_address = address.to_string();
        self
    }

    /// Sets the server API key.
    pub fn api_key(mut self, api_key: Option<&str>) -> Self {
        self.config.server.api_key = api_key.map(str::to_string);
        self
    }

    /// Sets the ticker interval.
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval_secs = interval;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> AppConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::FingerprintMode, models::NotificationMessage};

    fn write_config(content: &str) -> tempfile::TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("app.yaml"), content).unwrap();
        temp_dir
    }

    fn valid_config() -> AppConfig {
        AppConfig::builder()
            .region(RegionConfig::new("TR", 1, 3))
            .region(RegionConfig::new("na", 22, 2).with_interval(30))
            .build()
    }

    #[test]
    fn test_app_config_builder() {
        let config = AppConfig::builder()
            .region(RegionConfig::new("TR", 1, 3))
            .upstream_url(url::Url::parse("http://upstream.local").unwrap())
            .listen_address("127.0.0.1:0")
            .api_key(Some("key"))
            .build();

        assert_eq!(config.regions.len(), 1);
        assert!(config.upstream.base_url.is_some());
        assert_eq!(config.server.listen_address, "127.0.0.1:0");
        assert_eq!(config.server.api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_app_config_from_file() {
        let temp_dir = write_config(
            r#"
        regions:
          - id: TR
            window_start_hour: 1
            window_end_hour: 3
          - id: na
            window_start_hour: 22
            window_end_hour: 2
            check_interval_minutes: 15
        dispatch:
          cooldown_secs: 3600
          fingerprint_mode: content
        upstream:
          base_url: "http://upstream.local/api/"
        relay:
          url: "http://relay.local/push"
        tick_interval_secs: 30
        "#,
        );

        let config = AppConfig::new(Some(temp_dir.path().to_str().unwrap())).unwrap();

        assert_eq!(config.regions.len(), 2);
        assert_eq!(config.regions[0].id, RegionId::new("TR"));
        assert_eq!(config.regions[0].check_interval_minutes, 60);
        assert_eq!(config.regions[1].check_interval_minutes, 15);
        assert_eq!(config.dispatch.cooldown_secs, Duration::from_secs(3600));
        assert_eq!(config.dispatch.fingerprint_mode, FingerprintMode::Content);
        assert_eq!(config.dispatch.namespace, "valohub");
        assert_eq!(config.upstream.base_url.unwrap().as_str(), "http://upstream.local/api/");
        assert_eq!(config.relay.url.unwrap().as_str(), "http://relay.local/push");
        assert_eq!(config.tick_interval_secs, Duration::from_secs(30));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_app_config_from_file_with_endpoint_connections() {
        let temp_dir = write_config(
            r#"
        upstream:
          base_url: "http://upstream.local/"
          connection:
            connect_timeout_ms: 500
            max_idle: 16
        relay:
          url: "http://relay.local/push"
          connection:
            idle_timeout_secs: 15
        "#,
        );

        let config = AppConfig::new(Some(temp_dir.path().to_str().unwrap())).unwrap();

        assert_eq!(config.upstream.connection.connect_timeout_ms, Duration::from_millis(500));
        assert_eq!(config.upstream.connection.max_idle, 16);
        assert_eq!(config.relay.connection.idle_timeout_secs, Duration::from_secs(15));
        assert_eq!(config.relay.connection.connect_timeout_ms, Duration::from_secs(2));
    }

    #[test]
    fn test_app_config_from_file_with_env_var_override() {
        let temp_dir = write_config(
            r#"
        upstream:
          base_url: "http://upstream.local/"
          api_key: "from-file"
        "#,
        );

        unsafe {
            std::env::set_var("VALOHUB__UPSTREAM__API_KEY", "from-env");
        }

        let config = AppConfig::new(Some(temp_dir.path().to_str().unwrap())).unwrap();
        assert_eq!(config.upstream.api_key.as_deref(), Some("from-env"));

        unsafe {
            std::env::remove_var("VALOHUB__UPSTREAM__API_KEY");
        }
    }

    #[test]
    fn test_validate_accepts_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_hour() {
        let config = AppConfig::builder().region(RegionConfig::new("TR", 1, 24)).build();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidWindowHour { hour: 24, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = AppConfig::builder().region(RegionConfig::new("TR", 1, 3).with_interval(0)).build();
        assert!(matches!(config.validate(), Err(ConfigValidationError::ZeroInterval(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_region() {
        let config = AppConfig::builder()
            .region(RegionConfig::new("TR", 1, 3))
            .region(RegionConfig::new("TR", 4, 5))
            .build();
        assert!(matches!(config.validate(), Err(ConfigValidationError::DuplicateRegion(id)) if id.as_str() == "TR"));
    }

    #[test]
    fn test_validate_rejects_empty_namespace() {
        let mut config = valid_config();
        config.dispatch.namespace = " ".to_string();
        assert!(matches!(config.validate(), Err(ConfigValidationError::EmptyNamespace)));
    }

    #[test]
    fn test_validate_rejects_zero_retention_multiplier() {
        let mut config = valid_config();
        config.dispatch.retention_multiplier = 0;
        assert!(matches!(config.validate(), Err(ConfigValidationError::ZeroRetentionMultiplier)));

        config.dispatch.retention_multiplier = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_broken_template() {
        let mut config = valid_config();
        config.dispatch.message =
            NotificationMessage { title: "{{ name ".to_string(), body: "ok".to_string() };
        assert!(matches!(config.validate(), Err(ConfigValidationError::Template(_))));
    }

    #[test]
    fn test_validate_for_dispatch_requires_upstream() {
        let config = valid_config();
        assert!(matches!(
            config.validate_for_dispatch(),
            Err(ConfigValidationError::Missing("upstream.base_url"))
        ));
    }
}
