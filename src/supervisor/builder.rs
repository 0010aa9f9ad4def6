//! This module provides the `SupervisorBuilder` for constructing a `Supervisor`.

use std::sync::Arc;

use super::{Supervisor, SupervisorError};
use crate::{config::AppConfig, context::AppMetrics, engine::DispatchEngine};

/// A builder for creating a `Supervisor` instance.
#[derive(Default)]
pub struct SupervisorBuilder {
    config: Option<Arc<AppConfig>>,
    engine: Option<Arc<DispatchEngine>>,
    app_metrics: Option<AppMetrics>,
}

impl SupervisorBuilder {
    /// Creates a new, empty `SupervisorBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application configuration for the `Supervisor`.
    pub fn config(mut self, config: Arc<AppConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the dispatch engine for the `Supervisor`.
    pub fn engine(mut self, engine: Arc<DispatchEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Sets the application metrics. Fresh metrics are used when unset.
    pub fn app_metrics(mut self, app_metrics: AppMetrics) -> Self {
        self.app_metrics = Some(app_metrics);
        self
    }

    /// Ensures all required dependencies have been provided and builds the
    /// `Supervisor`.
    pub fn build(self) -> Result<Supervisor, SupervisorError> {
        let config = self.config.ok_or(SupervisorError::MissingConfig)?;
        let engine = self.engine.ok_or(SupervisorError::MissingEngine)?;
        let app_metrics = self.app_metrics.unwrap_or_default();

        tracing::debug!(regions = config.regions.len(), "Supervisor assembled.");
        Ok(Supervisor::new(config, engine, app_metrics))
    }
}
