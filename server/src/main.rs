use std::sync::Arc;

use anyhow::Context;
use tokio::{
    net::TcpListener,
    signal::unix::{signal, SignalKind},
    sync::broadcast,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use poker_server::{config::ServerConfig, coordinator::RoomCoordinator, registry::SessionRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present, before any env var reads
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "poker_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    // Rooms live in memory only, a restart starts from an empty registry
    let coordinator = Arc::new(RoomCoordinator::new(SessionRegistry::new()));

    let mut interrupt =
        signal(SignalKind::interrupt()).context("failed to create interrupt signal stream")?;
    let listener = TcpListener::bind(config.socket_addr())
        .await
        .with_context(|| format!("could not bind to {}", config.socket_addr()))?;
    let (quit_tx, quit_rx) = broadcast::channel::<()>(1);

    tracing::info!("Listening on {}", config.socket_addr());

    let server = tokio::spawn(poker_server::serve(listener, coordinator, quit_rx));

    interrupt.recv().await;
    quit_tx.send(()).context("failed to send quit signal")?;
    server.await.context("server task failed")?;

    Ok(())
}
