//! Corrector - Discord mention replacement bot
//!
//! Deletes guild messages that mention a configured user and reposts them
//! with the mention swapped for custom text. Rules are managed through the
//! `/correct` slash command and persisted per guild in SQLite.

mod common;
mod config;
mod discord;
mod health;
mod store;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tracing::{error, info, warn};

use store::ReplacementStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Corrector v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = config::load_and_validate().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Database: {}", config.store.url);
    info!("  Liveness port: {}", config.health.port);
    warn!("Ensure the privileged message content intent is enabled to read messages");

    // Open the replacement rule store
    let store = Arc::new(ReplacementStore::open(&config.store.url).map_err(|e| {
        error!("Failed to open replacement store: {}", e);
        e
    })?);

    // Connection flag shared between the gateway handler and the liveness endpoint
    let connected = Arc::new(AtomicBool::new(false));

    // Serve the liveness endpoint in the background; a bind failure is
    // logged but does not stop the bot.
    let health_state = health::HealthState {
        connected: connected.clone(),
    };
    let health_port = config.health.port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(health_state, health_port).await {
            error!("Liveness endpoint failed: {}", e);
        }
    });

    // Create and run the Discord client
    info!("Starting Discord bot...");
    let mut client = discord::build_client(&config.discord.token, store, connected).await?;
    let shard_manager = client.shard_manager.clone();

    tokio::select! {
        result = client.start() => {
            if let Err(e) = result {
                error!("Discord client error: {:?}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received - disconnecting...");
            shard_manager.shutdown_all().await;
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
