//! swap-status - transaction status lookups for cross-chain swap orders
//!
//! Runs as a stdio tool server for agent runtimes, as an HTTP API, or as a
//! one-shot CLI check.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use swap_status::tool::ToolServer;
use swap_status::{api, build_reconciler, Settings};

#[derive(Parser)]
#[command(name = "swap-status", version, about)]
struct Cli {
    /// Configuration file (defaults to $SWAP_STATUS_CONFIG or config/default.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the check_transaction_status tool over stdio
    Serve,
    /// Serve status lookups over HTTP
    Api,
    /// Print the status report for one initiator source address
    Check { address: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.json_logs);

    info!("Starting swap-status v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    let reconciler = Arc::new(build_reconciler(&settings)?);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let server = ToolServer::new(reconciler);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            server
                .run(stdin, tokio::io::stdout())
                .await
                .context("Tool server failed")?;
        }
        Command::Api => {
            tokio::select! {
                result = api::run_server(settings.api.clone(), reconciler) => {
                    result.context("API server failed")?;
                }
                _ = shutdown_signal() => {
                    info!("Shutdown signal received, stopping...");
                }
            }
        }
        Command::Check { address } => {
            let report = reconciler.transaction_status(&address).await;
            print!("{}", report);
        }
    }

    info!("swap-status stopped");
    Ok(())
}

fn init_logging(json: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,swap_status=debug,sqlx=warn,hyper=warn")
    });

    // stdout belongs to the tool protocol
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
