//! The Supervisor module manages the lifecycle of the Valohub service.
//!
//! The supervisor is the top-level owner of the long-running tasks: the HTTP
//! ingest server, the region ticker and the consumer of due-region events.
//!
//! ## Responsibilities
//!
//! - **Lifecycle Management**: The `Supervisor` starts all services and manages
//!   their lifetimes.
//! - **Graceful Shutdown**: It listens for shutdown signals (Ctrl+C or
//!   SIGTERM) and cancels every managed task through a shared
//!   `CancellationToken`.
//! - **Task Supervision**: If a task panics, the supervisor shuts down the
//!   others so the process exits instead of running half-functional.

mod builder;

use std::sync::Arc;

pub use builder::SupervisorBuilder;
use thiserror::Error;
use tokio::{signal, sync::mpsc};
use tokio_util::sync::CancellationToken;

use crate::{
    config::AppConfig,
    context::AppMetrics,
    engine::{DispatchEngine, RegionTicker},
    http_server,
    models::RegionId,
};

/// Lower bound of the due-region channel capacity.
const MIN_DUE_CHANNEL_CAPACITY: usize = 16;

/// Represents the set of errors that can occur during the supervisor's
/// operation.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A required configuration was not provided to the `SupervisorBuilder`.
    #[error("Missing configuration for Supervisor")]
    MissingConfig,

    /// A dispatch engine was not provided to the `SupervisorBuilder`.
    #[error("Missing dispatch engine for Supervisor")]
    MissingEngine,
}

/// The primary runtime manager for the application.
pub struct Supervisor {
    /// Shared application configuration.
    config: Arc<AppConfig>,

    /// The dispatch engine shared by the server and the ticker.
    engine: Arc<DispatchEngine>,

    /// The shared application metrics.
    app_metrics: AppMetrics,

    /// A token used to signal a graceful shutdown to all supervised tasks.
    cancellation_token: CancellationToken,

    /// A set of all spawned tasks that the supervisor is actively managing.
    join_set: tokio::task::JoinSet<()>,
}

impl Supervisor {
    /// Creates a new Supervisor instance with all its required components.
    pub fn new(config: Arc<AppConfig>, engine: Arc<DispatchEngine>, app_metrics: AppMetrics) -> Self {
        Self {
            config,
            engine,
            app_metrics,
            cancellation_token: CancellationToken::new(),
            join_set: tokio::task::JoinSet::new(),
        }
    }

    /// Returns a new `SupervisorBuilder` instance.
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::new()
    }

    /// Returns a handle that stops the supervisor when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Starts the supervisor and all its managed services, and returns once
    /// they have all stopped.
    pub async fn run(mut self) -> Result<(), SupervisorError> {
        let cancellation_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            tokio::select! {
                _ = shutdown_signal() => cancellation_token.cancel(),
                _ = cancellation_token.cancelled() => {}
            }
        });

        if self.config.server.enabled {
            let config = Arc::clone(&self.config);
            let engine = Arc::clone(&self.engine);
            let app_metrics = self.app_metrics.clone();
            let token = self.cancellation_token.clone();
            self.join_set.spawn(async move {
                if let Err(e) =
                    http_server::run_server_from_config(config, engine, app_metrics, token.clone())
                        .await
                {
                    tracing::error!(error = %e, "HTTP server failed. Initiating shutdown.");
                    token.cancel();
                }
            });
        }

        let capacity = (self.config.regions.len() * 2).max(MIN_DUE_CHANNEL_CAPACITY);
        let (due_tx, due_rx) = mpsc::channel::<RegionId>(capacity);

        let ticker =
            RegionTicker::new(Arc::clone(&self.engine), self.config.tick_interval_secs, due_tx);
        let ticker_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            ticker.run(ticker_token).await;
        });

        let app_metrics = self.app_metrics.clone();
        let due_token = self.cancellation_token.clone();
        self.join_set.spawn(record_due_regions(due_rx, app_metrics, due_token));

        loop {
            tokio::select! {
                maybe_result = self.join_set.join_next() => {
                    match maybe_result {
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::error!("A critical task failed: {:?}. Initiating shutdown.", e);
                            self.cancellation_token.cancel();
                        }
                        None => break,
                    }
                }
                _ = self.cancellation_token.cancelled() => break,
            }
        }

        let shutdown_timeout = self.config.shutdown_timeout;
        let drain = async {
            while self.join_set.join_next().await.is_some() {}
        };
        if tokio::time::timeout(shutdown_timeout, drain).await.is_err() {
            tracing::warn!(
                "Tasks did not stop within the timeout of {:?}. Aborting them.",
                shutdown_timeout
            );
            self.join_set.shutdown().await;
        }
        tracing::info!("All supervised tasks have completed.");

        for entry in self.engine.get_dispatched_notifications().iter() {
            tracing::info!(region = %entry.key(), notifications = *entry.value(), "Final state.");
        }
        tracing::info!("Supervisor shutdown complete.");
        Ok(())
    }
}

/// Counts every due signal published by the ticker until the channel closes
/// or `token` is cancelled.
async fn record_due_regions(
    mut due_rx: mpsc::Receiver<RegionId>,
    app_metrics: AppMetrics,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            maybe_region = due_rx.recv() => match maybe_region {
                Some(region) => {
                    tracing::info!(
                        region = %region,
                        "Region is due for a check; waiting for its next batch."
                    );
                    app_metrics.record_due(&region).await;
                }
                None => break,
            },
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = signal::ctrl_c();
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to register SIGTERM handler.");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown."),
        _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
    }
}
