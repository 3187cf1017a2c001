//! jrcd - JSON Relay Chat Daemon.
//!
//! CLI entry point: parse flags, set up tracing, run the broker until a
//! termination signal lands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use jrcd::{Broker, Config};
use tracing::info;

/// JSON Relay Chat Daemon.
#[derive(Debug, Parser)]
#[command(name = "jrcd", version, about)]
struct Cli {
    /// Host to bind the listener to.
    #[arg(long, default_value = jrcd::config::DEFAULT_HOSTNAME)]
    hostname: String,

    /// Port to bind the listener to.
    #[arg(long, default_value_t = jrcd::config::DEFAULT_PORT)]
    port: u16,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match &cli.log {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .init();
        }
    }

    let config = Config {
        hostname: cli.hostname,
        port: cli.port,
        ..Config::default()
    };

    info!(
        hostname = %config.hostname,
        port = config.port,
        "Starting jrcd"
    );

    // Bind failures (address already in use, unresolvable host) exit nonzero.
    let broker = Broker::bind(config).await?;

    // Termination signals trigger ordered shutdown, not failure.
    {
        let hub = broker.hub();
        tokio::spawn(async move {
            use tokio::signal::unix::{SignalKind, signal};
            let mut sigint = match signal(SignalKind::interrupt()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGINT handler");
                    return;
                }
            };
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                _ = sigint.recv() => info!("Received SIGINT - initiating graceful shutdown"),
                _ = sigterm.recv() => info!("Received SIGTERM - initiating graceful shutdown"),
            }

            hub.signal_shutdown();
        });
    }

    broker.run().await?;

    info!("Shutdown complete");
    Ok(())
}
