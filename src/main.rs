//! Gatherer Binary Entry Point
//!
//! Runs the agent with the collectors defined in the configuration file until
//! Ctrl+C, SIGTERM, or the optional `--run-for` duration elapses.
//! Core functionality is provided by the `gatherer` library crate.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use gatherer::{
    Agent, DemoCollector,
    config::{AppConfig, parse_duration},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Gatherer - Plugin-style Event Collection Agent
#[derive(Parser, Debug)]
#[command(name = "gatherer", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "configs/config.yaml",
        env = "GATHERER_CONFIG"
    )]
    config: String,

    /// Event buffer capacity (overrides config file)
    #[arg(long, env = "GATHERER_BUFFER_SIZE")]
    buffer_size: Option<usize>,

    /// Stop after this long instead of waiting for a signal (e.g. "10s")
    #[arg(long, value_parser = parse_duration)]
    run_for: Option<Duration>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gatherer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Gatherer - Plugin-style Event Collection Agent");

    let cli = Cli::parse();

    tracing::info!("Loading configuration from: {}", cli.config);
    let mut config = AppConfig::read_with_collector_path(&cli.config)?;

    // CLI/env overrides (CLI > ENV > config file)
    if let Some(buffer_size) = cli.buffer_size {
        config.agent.buffer_size = buffer_size;
    }
    config.validate()?;

    let mut agent = config.agent.builder().build()?;
    tracing::info!(buffer_size = agent.buffer_size(), "Agent created");

    for demo in config.collectors.enabled_demo() {
        let collector = Arc::new(DemoCollector::new(demo.clone()));
        if let Err(e) = agent.register_collector(demo.name.clone(), collector).await {
            tracing::error!("Failed to register collector '{}': {}", demo.name, e);
        }
    }
    tracing::info!("Registered {} collectors", agent.collector_count());

    if let Err(e) = agent.start().await {
        tracing::error!("Some collectors failed to start: {}", e);
    }

    match cli.run_for {
        Some(duration) => {
            tracing::info!("Running for {:?}", duration);
            tokio::time::sleep(duration).await;
        }
        None => {
            tracing::info!("Press Ctrl+C to shutdown");
            shutdown_signal().await;
        }
    }

    shutdown(&mut agent).await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Stop and destroy the agent, logging aggregated collector failures.
async fn shutdown(agent: &mut Agent) {
    tracing::info!("Stopping collectors...");
    if let Err(e) = agent.stop().await {
        tracing::error!("Failed to stop collectors: {}", e);
    }

    tracing::info!("Destroying collectors...");
    if let Err(e) = agent.destroy().await {
        tracing::error!("Failed to destroy collectors: {}", e);
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
