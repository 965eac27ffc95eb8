mod config;
mod repl;

use clap::{Parser, Subcommand};
use config::{ClientConfig, BASE_URL_ENV};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use truthguard_engine::{AppContext, HttpBackend};
use truthguard_session::FileCredentialStore;

#[derive(Parser)]
#[command(name = "truthguard", about = "TruthGuard: chat with bias analysis")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "truthguard.toml")]
    config: PathBuf,

    /// Service base URL (overrides config and environment)
    #[arg(long)]
    base_url: Option<String>,

    /// Directory for the credential file (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat (default)
    Chat,
    /// Check that the service is reachable
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = ClientConfig::load(&cli.config).await?.with_overrides(
        std::env::var(BASE_URL_ENV).ok(),
        cli.base_url,
        cli.data_dir,
    );

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Status => {
            let backend = HttpBackend::new(config.service)?;
            match backend.health().await {
                Ok(health) => println!("{}: {}", backend.config().base_url, health.status),
                Err(e) => anyhow::bail!(
                    "Service at {} is unreachable: {e}",
                    backend.config().base_url
                ),
            }
        }
        Commands::Chat => {
            info!(base_url = %config.service.base_url, "Starting TruthGuard client");
            let credentials = Arc::new(FileCredentialStore::new(config.data_dir.clone()).await?);
            let ctx = AppContext::http(config.service, credentials)?;

            match ctx.auth().restore().await {
                Ok(session) => {
                    info!(authenticated = session.is_authenticated(), "Session restored");
                }
                Err(e) => warn!(error = %e, "Could not restore session, continuing as guest"),
            }

            repl::run(ctx).await?;
        }
    }

    Ok(())
}
