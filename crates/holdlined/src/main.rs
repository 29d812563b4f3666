//! holdlined — the holdline daemon.
//!
//! Serves the keep-alive streaming API over HTTP.
//!
//! # Usage
//!
//! ```text
//! holdlined serve --port 8080 --config /etc/holdline/holdlined.toml --interval 30s
//! ```

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use holdline_core::{KeepAlive, KeepAliveConfig, parse_duration};
use tracing::info;

use crate::config::DaemonConfig;

#[derive(Parser)]
#[command(name = "holdlined", about = "holdline keep-alive daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        /// Port to listen on (overrides the config file).
        #[arg(long)]
        port: Option<u16>,

        /// Path to a holdlined.toml config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Heartbeat interval, e.g. "30s" or "500ms" (overrides the config file).
        #[arg(long)]
        interval: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,holdlined=debug,holdline_core=debug,holdline_api=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            config,
            interval,
        } => {
            let mut daemon = match config {
                Some(path) => {
                    let loaded = DaemonConfig::from_file(&path)?;
                    info!(path = ?path, "config loaded");
                    loaded
                }
                None => DaemonConfig::default(),
            };
            if let Some(port) = port {
                daemon.listen_port = port;
            }
            if let Some(raw) = interval {
                daemon.keepalive = KeepAliveConfig::with_interval(parse_duration(&raw)?)?;
            }
            serve(daemon).await
        }
    }
}

async fn serve(config: DaemonConfig) -> anyhow::Result<()> {
    let responder = KeepAlive::new(config.keepalive);
    info!(interval = ?responder.interval(), "keep-alive responder ready");

    let router = holdline_api::build_router(responder);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("holdline daemon stopped");
    Ok(())
}
