use std::sync::Arc;

use tokio::{net::TcpListener, sync::broadcast, task::JoinSet};

pub mod config;
pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod session;

use crate::coordinator::RoomCoordinator;

/// Accepts connections until a shutdown signal is received, then waits for every session to end
pub async fn serve(
    listener: TcpListener,
    coordinator: Arc<RoomCoordinator>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut join_set: JoinSet<anyhow::Result<()>> = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!("Server interrupted. Gracefully shutting down.");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((socket, peer)) => {
                    tracing::debug!(%peer, "accepted connection");
                    join_set.spawn(session::handle_user_session(
                        coordinator.clone(),
                        shutdown_rx.resubscribe(),
                        socket,
                    ));
                }
                Err(e) => tracing::warn!(error = %e, "failed to accept connection"),
            },
            Some(finished) = join_set.join_next() => log_session_end(finished),
        }
    }

    while let Some(finished) = join_set.join_next().await {
        log_session_end(finished);
    }
    tracing::info!("Server shut down");
}

fn log_session_end(finished: Result<anyhow::Result<()>, tokio::task::JoinError>) {
    match finished {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "session ended with an error"),
        Err(e) => tracing::error!(error = %e, "session task failed"),
    }
}
