use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use valohub::{
    cmd::{DryRunArgs, dry_run},
    context::{AppContextBuilder, AppMetrics},
    supervisor::Supervisor,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the ingest server and the region ticker.
    Run {
        /// Directory holding `app.yaml`. Defaults to `configs`.
        #[arg(short, long)]
        config_dir: Option<String>,
    },
    /// Dispatches a single batch file and prints the result.
    DryRun(DryRunArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config_dir } => run_supervisor(config_dir).await?,
        Commands::DryRun(args) => dry_run::execute(args).await?,
    }

    Ok(())
}

async fn run_supervisor(config_dir: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let context = AppContextBuilder::new(config_dir).build().await?;

    let supervisor = Supervisor::builder()
        .config(context.config)
        .engine(context.engine)
        .app_metrics(AppMetrics::default())
        .build()?;

    tracing::info!("Supervisor initialized, starting service...");

    supervisor.run().await?;

    Ok(())
}
