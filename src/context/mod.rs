//! Application context and initialization logic.
//!
//! This module loads and validates the configuration, builds the shared HTTP
//! clients and the upstream and relay adapters, and assembles the dispatch
//! engine over the configured regions.

mod error;
mod metrics;

use std::sync::Arc;

pub use error::AppContextError;
pub use metrics::{AppMetrics, Metrics};

use crate::{
    config::{AppConfig, ConfigValidationError},
    engine::{ChangeDetector, DispatchEngine, RegionRegistry, RegionSchedule},
    http_client::HttpClientPool,
    notification::{ChannelNamer, MessageComposer, NotificationSink, RelaySink, StdoutSink},
    providers::{GuardedUpstream, HttpUpstream},
};

/// The application context, holding the configuration and the dispatch
/// engine built from it.
pub struct AppContext {
    /// Shared application configuration.
    pub config: Arc<AppConfig>,

    /// The dispatch engine.
    pub engine: Arc<DispatchEngine>,

    /// The pool the upstream and relay clients were taken from. The relay
    /// client never retries.
    pub http_client_pool: Arc<HttpClientPool>,
}

/// A builder for the `AppContext`, allowing configuration overrides
/// and step-by-step initialization.
#[derive(Default)]
pub struct AppContextBuilder {
    /// Optional configuration directory to load settings from.
    config_dir: Option<String>,

    /// Already loaded configuration, bypassing the config directory.
    config: Option<AppConfig>,

    /// Optional sink replacing the configured relay.
    sink_override: Option<Arc<dyn NotificationSink>>,
}

impl AppContextBuilder {
    /// Creates a new `AppContextBuilder` with an optional configuration
    /// directory.
    pub fn new(config_dir: Option<String>) -> Self {
        Self { config_dir, ..Default::default() }
    }

    /// Uses `config` instead of reading the configuration directory.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sends notifications through `sink` instead of the configured relay.
    pub fn sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink_override = Some(sink);
        self
    }

    /// Builds the `AppContext`, performing all initialization steps.
    pub async fn build(self) -> Result<AppContext, AppContextError> {
        let config = match self.config {
            Some(config) => config,
            None => {
                tracing::debug!("Loading application configuration...");
                AppConfig::new(self.config_dir.as_deref())?
            }
        };
        config.validate_for_dispatch()?;
        tracing::debug!(
            regions = config.regions.len(),
            upstream = ?config.upstream.base_url,
            relay = ?config.relay.url,
            "Configuration loaded."
        );

        let http_client_pool = Arc::new(HttpClientPool::new());
        let upstream_client = http_client_pool
            .get_or_create(&config.upstream.connection, Some(&config.http_retry_config))
            .await?;

        let base_url = config
            .upstream
            .base_url
            .clone()
            .ok_or(ConfigValidationError::Missing("upstream.base_url"))?;
        let http_upstream =
            Arc::new(HttpUpstream::new(base_url, upstream_client, config.upstream.api_key.clone()));
        let upstream = GuardedUpstream::new(
            http_upstream.clone(),
            http_upstream,
            config.dispatch.call_timeout_ms,
        );

        let sink: Arc<dyn NotificationSink> = match (self.sink_override, &config.relay.url) {
            (Some(sink), _) => sink,
            (None, Some(url)) => {
                tracing::info!(relay = %url, "Notifications will be delivered to the push relay.");
                let relay_client =
                    http_client_pool.get_or_create(&config.relay.connection, None).await?;
                Arc::new(RelaySink::new(
                    url.clone(),
                    relay_client,
                    config.relay.secret.clone(),
                    Some(config.relay.headers.clone()),
                ))
            }
            (None, None) => {
                tracing::warn!("No relay configured; notifications will be printed to stdout.");
                Arc::new(StdoutSink)
            }
        };

        let engine = Arc::new(build_engine(&config, upstream, sink)?);
        tracing::info!(regions = ?engine.registry().regions(), "Dispatch engine initialized.");

        Ok(AppContext { config: Arc::new(config), engine, http_client_pool })
    }
}

/// Assembles a dispatch engine over the configured regions.
pub fn build_engine(
    config: &AppConfig,
    upstream: GuardedUpstream,
    sink: Arc<dyn NotificationSink>,
) -> Result<DispatchEngine, ConfigValidationError> {
    let policy = config.dispatch.cooldown_policy()?;
    let schedule = RegionSchedule::new(config.regions.iter().cloned());
    let registry = RegionRegistry::new(config.regions.iter().map(|r| r.id.clone()), policy);

    Ok(DispatchEngine::new(Arc::new(schedule), Arc::new(registry), upstream, sink)
        .with_composer(MessageComposer::new(config.dispatch.message.clone()))
        .with_channel_namer(ChannelNamer::new(config.dispatch.namespace.clone()))
        .with_change_detector(ChangeDetector::new(config.dispatch.fingerprint_mode))
        .with_send_timeout(config.dispatch.call_timeout_ms))
}
