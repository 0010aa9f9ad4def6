//! `valohub dry-run`: dispatches one batch file against the configured
//! upstream, printing notifications instead of delivering them.

use std::{path::PathBuf, sync::Arc};

use chrono::{DateTime, Utc};
use clap::Parser;
use thiserror::Error;

use crate::{
    context::{AppContextBuilder, AppContextError},
    engine::DispatchError,
    models::{DispatchResult, InboundBatch, RegionId},
    notification::StdoutSink,
};

/// Errors that can occur during a dry run.
#[derive(Error, Debug)]
pub enum DryRunError {
    /// The batch file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The batch file or the result could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The application could not be initialized.
    #[error("Initialization error: {0}")]
    Context(#[from] AppContextError),

    /// The batch was rejected by the engine.
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Arguments of the dry-run command.
#[derive(Parser, Debug)]
pub struct DryRunArgs {
    /// Path to a JSON file holding one inbound batch.
    #[arg(short, long)]
    pub batch: PathBuf,

    /// Directory holding `app.yaml`. Defaults to `configs`.
    #[arg(short, long)]
    pub config_dir: Option<String>,

    /// Evaluate the batch as if it arrived at this RFC 3339 timestamp.
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

/// Runs the dry run and prints the dispatch result as JSON.
pub async fn execute(args: DryRunArgs) -> Result<(), DryRunError> {
    let result = run(args).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Runs the dry run and returns the dispatch result.
pub async fn run(args: DryRunArgs) -> Result<DispatchResult, DryRunError> {
    let content = tokio::fs::read_to_string(&args.batch).await?;
    let batch: InboundBatch = serde_json::from_str(&content)?;

    let context =
        AppContextBuilder::new(args.config_dir).sink(Arc::new(StdoutSink)).build().await?;

    let region = RegionId::new(batch.region.clone());
    let source = batch.source_or(&context.config.dispatch.default_source);
    let now = args.at.unwrap_or_else(Utc::now);
    tracing::info!(region = %region, source = %source, items = batch.items.len(), at = %now, "Starting dry run...");

    let result = context.engine.dispatch_at(&region, &batch.items, source, now).await?;
    tracing::info!(notified = result.notified_count, "Dry run finished.");
    Ok(result)
}
