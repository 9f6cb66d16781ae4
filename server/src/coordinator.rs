use std::collections::HashMap;

use comms::{command::UserCommand, event::Event};
use tokio::sync::{mpsc, Mutex};

use crate::{
    dispatcher::{self, Delivery},
    registry::SessionRegistry,
};

/// Events queued for a single connection, drained by its session task
pub type EventReceiver = mpsc::Receiver<Event>;

/// How many undelivered events a connection may have before it is evicted
const OUTBOX_CAPACITY: usize = 100;

#[derive(Debug)]
struct CoordinatorState {
    registry: SessionRegistry,
    /// `None` marks a connection evicted for not reading its events,
    /// it stays here until its disconnect cleanup has run
    outboxes: HashMap<String, Option<mpsc::Sender<Event>>>,
}

impl CoordinatorState {
    fn is_live(&self, participant_id: &str) -> bool {
        matches!(self.outboxes.get(participant_id), Some(Some(_)))
    }

    fn deliver(&mut self, deliveries: Vec<Delivery>) {
        let mut evicted = Vec::new();

        for Delivery { recipients, event } in deliveries {
            for recipient in recipients {
                let Some(Some(outbox)) = self.outboxes.get(&recipient) else {
                    tracing::debug!(participant = %recipient, "no live connection, dropping event");
                    continue;
                };

                match outbox.try_send(event.clone()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::warn!(participant = %recipient, "outbox full, evicting connection");
                        evicted.push(recipient);
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        tracing::debug!(participant = %recipient, "outbox closed, dropping event");
                    }
                }
            }
        }

        // dropping the sender ends the session's event stream once it is drained
        for participant_id in evicted {
            if let Some(outbox) = self.outboxes.get_mut(&participant_id) {
                *outbox = None;
            }
        }
    }
}

/// [RoomCoordinator] is the single point every command and disconnect goes through
///
/// It owns the [SessionRegistry] and the outboxes of the live connections behind one lock.
/// A command is dispatched and its events are queued before the lock is released, so each
/// event runs to completion and every connection sees events in the order the mutations happened.
///
/// Outboxes are bounded. A connection which falls [OUTBOX_CAPACITY] events behind is evicted:
/// its outbox is closed and its commands are ignored until its session disconnects it.
#[derive(Debug)]
pub struct RoomCoordinator {
    state: Mutex<CoordinatorState>,
    outbox_capacity: usize,
}

impl RoomCoordinator {
    pub fn new(registry: SessionRegistry) -> Self {
        Self::with_outbox_capacity(registry, OUTBOX_CAPACITY)
    }

    pub fn with_outbox_capacity(registry: SessionRegistry, outbox_capacity: usize) -> Self {
        RoomCoordinator {
            state: Mutex::new(CoordinatorState {
                registry,
                outboxes: HashMap::new(),
            }),
            outbox_capacity,
        }
    }

    /// Register a freshly accepted connection and hand out the receiving end of its outbox
    pub async fn register(&self, participant_id: &str) -> anyhow::Result<EventReceiver> {
        let mut state = self.state.lock().await;

        if state.outboxes.contains_key(participant_id) {
            return Err(anyhow::anyhow!(
                "participant '{}' is already connected",
                participant_id
            ));
        }

        let (outbox_tx, outbox_rx) = mpsc::channel(self.outbox_capacity);
        state
            .outboxes
            .insert(String::from(participant_id), Some(outbox_tx));
        tracing::info!(participant = %participant_id, "participant connected");

        Ok(outbox_rx)
    }

    /// Handle a command sent by a registered connection
    pub async fn handle_command(&self, participant_id: &str, command: UserCommand) {
        if let UserCommand::Quit(_) = command {
            self.disconnect(participant_id).await;
            return;
        }

        let mut state = self.state.lock().await;

        if !state.is_live(participant_id) {
            tracing::warn!(participant = %participant_id, "command from unregistered or evicted connection ignored");
            return;
        }

        let deliveries = dispatcher::handle_command(&mut state.registry, participant_id, command);
        state.deliver(deliveries);
    }

    /// Clean up after a lost connection
    ///
    /// Only the first call for a participant does anything, returns whether cleanup ran.
    pub async fn disconnect(&self, participant_id: &str) -> bool {
        let mut state = self.state.lock().await;

        if state.outboxes.remove(participant_id).is_none() {
            return false;
        }

        let deliveries = dispatcher::handle_disconnect(&mut state.registry, participant_id);
        state.deliver(deliveries);
        tracing::info!(participant = %participant_id, "participant disconnected");

        true
    }

    /// Read-only view of the registry
    pub async fn inspect<R>(&self, f: impl FnOnce(&SessionRegistry) -> R) -> R {
        let state = self.state.lock().await;

        f(&state.registry)
    }
}
