use std::{sync::Arc, time::Duration};

use anyhow::Context;
use comms::{
    command::UserCommand,
    event::{self, Event},
    transport::{
        self,
        server::{CommandStream, EventWriter},
    },
};
use nanoid::nanoid;
use tokio::{net::TcpStream, sync::broadcast};
use tokio_stream::StreamExt;

use crate::coordinator::{EventReceiver, RoomCoordinator};

/// How long a single event write may stall before the session is dropped
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Given a tcp stream and the room coordinator, handles the participant session
/// until the participant quits, or the tcp stream is closed for some reason, or the server shuts down
///
/// Whichever way the session ends, the participant is disconnected from the coordinator exactly once.
pub async fn handle_user_session(
    coordinator: Arc<RoomCoordinator>,
    quit_rx: broadcast::Receiver<()>,
    stream: TcpStream,
) -> anyhow::Result<()> {
    // Every connection is a new participant, identities do not survive reconnects
    let participant_id = nanoid!();
    // Split the tcp stream into a command stream and an event writer with better ergonomics
    let (mut commands, mut event_writer) = transport::server::split_tcp_stream(stream);
    let mut events = coordinator.register(&participant_id).await?;

    let result = run_session(
        &coordinator,
        &participant_id,
        quit_rx,
        &mut commands,
        &mut event_writer,
        &mut events,
    )
    .await;

    // the stream halves are still alive here, they close only after cleanup
    coordinator.disconnect(&participant_id).await;

    result
}

async fn run_session(
    coordinator: &RoomCoordinator,
    participant_id: &str,
    mut quit_rx: broadcast::Receiver<()>,
    commands: &mut CommandStream,
    event_writer: &mut EventWriter,
    events: &mut EventReceiver,
) -> anyhow::Result<()> {
    // Let the participant know which id the server knows it by
    write_event(
        event_writer,
        &Event::Connected(event::ConnectedReplyEvent {
            participant_id: String::from(participant_id),
        }),
    )
    .await?;

    loop {
        tokio::select! {
            cmd = commands.next() => match cmd {
                // The participant closed the tcp stream or asked to quit
                None | Some(Ok(UserCommand::Quit(_))) => break,
                Some(Ok(cmd)) => coordinator.handle_command(participant_id, cmd).await,
                // A broken frame is answered, the session goes on
                Some(Err(e)) => {
                    tracing::warn!(participant = %participant_id, error = %e, "malformed command");
                    write_event(event_writer, &Event::error("Invalid command")).await?;
                }
            },
            // Replies and room broadcasts queued by the coordinator
            event = events.recv() => match event {
                Some(event) => write_event(event_writer, &event).await?,
                // The coordinator evicted the participant for not keeping up
                None => {
                    tracing::warn!(participant = %participant_id, "outbox closed, closing session");
                    break;
                }
            },
            Ok(_) = quit_rx.recv() => {
                tracing::info!(participant = %participant_id, "server shutting down, closing session");
                break;
            }
        }
    }

    Ok(())
}

/// Write a single event, giving up on a participant which stopped reading
async fn write_event(event_writer: &mut EventWriter, event: &Event) -> anyhow::Result<()> {
    tokio::time::timeout(WRITE_TIMEOUT, event_writer.write(event))
        .await
        .context("timed out writing to the participant")?
}
