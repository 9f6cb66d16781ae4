//! Translates inbound commands and disconnects into registry mutations and the
//! events they produce.
//!
//! The dispatcher holds no state of its own: every call takes the [SessionRegistry],
//! applies at most one mutation and returns the [Delivery]s derived from the state it left behind.

use comms::{
    command::UserCommand,
    event::{
        ActiveRoomsReplyEvent, AdminAssignedBroadcastEvent, Event, JoinRoomReplyEvent,
        KickedReplyEvent, RoomCreatedReplyEvent, RoomNoticeBroadcastEvent,
        UserCountBroadcastEvent, UserListBroadcastEvent, VotesClearedBroadcastEvent,
        VotesRevealedBroadcastEvent,
    },
};

use crate::{
    error::{AdminAction, CommandRejection},
    registry::{Admission, PokerRoom, SessionRegistry},
};

/// An event together with the participants it must be delivered to
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub recipients: Vec<String>,
    pub event: Event,
}

/// Collects the deliveries of a single command in the order they must be sent
#[derive(Debug, Default)]
struct Outbox {
    deliveries: Vec<Delivery>,
}

impl Outbox {
    fn reply(&mut self, participant_id: &str, event: Event) {
        self.deliveries.push(Delivery {
            recipients: vec![String::from(participant_id)],
            event,
        });
    }

    /// Send to every current member of the room
    fn broadcast(&mut self, room: &PokerRoom, event: Event) {
        self.deliveries.push(Delivery {
            recipients: room.member_ids(),
            event,
        });
    }

    /// Send to every current member of the room except one
    fn broadcast_except(&mut self, room: &PokerRoom, excluded_id: &str, event: Event) {
        let recipients = room
            .member_ids()
            .into_iter()
            .filter(|member| member != excluded_id)
            .collect::<Vec<_>>();

        if !recipients.is_empty() {
            self.deliveries.push(Delivery { recipients, event });
        }
    }

    fn membership(&mut self, room: &PokerRoom) {
        self.broadcast(
            room,
            Event::UserCount(UserCountBroadcastEvent {
                room: String::from(room.id()),
                count: room.size(),
            }),
        );
        self.broadcast(
            room,
            Event::UserList(UserListBroadcastEvent {
                room: String::from(room.id()),
                users: room.member_ids(),
            }),
        );
    }

    fn admin(&mut self, room: &PokerRoom) {
        self.broadcast(
            room,
            Event::AdminAssigned(AdminAssignedBroadcastEvent {
                room: String::from(room.id()),
                user_id: String::from(room.admin_id()),
            }),
        );
    }
}

/// Apply a command sent by `caller_id` and return what has to be sent to whom
///
/// A rejected command changes nothing and produces a single reply to the caller.
pub fn handle_command(
    registry: &mut SessionRegistry,
    caller_id: &str,
    command: UserCommand,
) -> Vec<Delivery> {
    tracing::debug!(participant = %caller_id, ?command, "handling command");

    let mut outbox = Outbox::default();
    let result = match command {
        UserCommand::CreateRoom(cmd) => create_room(registry, &mut outbox, caller_id, &cmd.room),
        UserCommand::JoinRoom(cmd) => {
            // join failures are answered through the join result instead of the generic error
            if let Err(rejection) = join_room(registry, &mut outbox, caller_id, &cmd.room) {
                tracing::warn!(participant = %caller_id, room = %cmd.room, %rejection, "join rejected");
                outbox.reply(
                    caller_id,
                    Event::JoinRoomResult(JoinRoomReplyEvent {
                        room: cmd.room,
                        success: false,
                        error: Some(rejection.to_string()),
                    }),
                );
            }
            Ok(())
        }
        UserCommand::GetActiveRooms(_) => {
            outbox.reply(
                caller_id,
                Event::ActiveRooms(ActiveRoomsReplyEvent {
                    rooms: registry.list_room_ids(),
                }),
            );
            Ok(())
        }
        UserCommand::Vote(cmd) => vote(registry, &mut outbox, caller_id, &cmd.room, cmd.vote),
        UserCommand::RevealVotes(cmd) => reveal_votes(registry, &mut outbox, caller_id, &cmd.room),
        UserCommand::KickUser(cmd) => {
            kick_user(registry, &mut outbox, caller_id, &cmd.room, &cmd.user_id)
        }
        UserCommand::ClearVotes(cmd) => clear_votes(registry, &mut outbox, caller_id, &cmd.room),
        UserCommand::Quit(_) => return handle_disconnect(registry, caller_id),
    };

    if let Err(rejection) = result {
        tracing::warn!(participant = %caller_id, %rejection, "command rejected");
        outbox.reply(caller_id, Event::error(rejection.to_string()));
    }

    outbox.deliveries
}

/// Remove a lost connection from every room it was a member of
///
/// Rooms left without members are deleted, rooms which lost their admin get a new one.
/// Never fails, a participant in no rooms produces no deliveries.
pub fn handle_disconnect(registry: &mut SessionRegistry, participant_id: &str) -> Vec<Delivery> {
    let mut outbox = Outbox::default();

    for room_id in registry.rooms_of(participant_id) {
        if let Ok(room) = registry.get_mut(&room_id) {
            room.remove_member(participant_id);

            if !room.is_empty() {
                if let Some(new_admin) = room.reassign_admin_if_needed(participant_id) {
                    tracing::info!(room = %room_id, admin = %new_admin, "admin reassigned");
                    outbox.admin(room);
                }
                outbox.membership(room);
                continue;
            }
        }

        if registry.delete_if_empty(&room_id) {
            tracing::info!(room = %room_id, "room deleted");
        }
    }

    outbox.deliveries
}

fn create_room(
    registry: &mut SessionRegistry,
    outbox: &mut Outbox,
    caller_id: &str,
    room_id: &str,
) -> Result<(), CommandRejection> {
    let room = registry.create_room(room_id, caller_id)?;
    tracing::info!(room = %room_id, admin = %caller_id, "room created");

    outbox.reply(
        caller_id,
        Event::RoomCreated(RoomCreatedReplyEvent {
            room: String::from(room_id),
        }),
    );
    outbox.broadcast(
        room,
        Event::UserCount(UserCountBroadcastEvent {
            room: String::from(room_id),
            count: room.size(),
        }),
    );
    outbox.admin(room);
    outbox.broadcast(
        room,
        Event::UserList(UserListBroadcastEvent {
            room: String::from(room_id),
            users: room.member_ids(),
        }),
    );

    Ok(())
}

fn join_room(
    registry: &mut SessionRegistry,
    outbox: &mut Outbox,
    caller_id: &str,
    room_id: &str,
) -> Result<(), CommandRejection> {
    let room = registry.get_mut(room_id)?;
    if room.add_member(caller_id) == Admission::AlreadyMember {
        return Err(CommandRejection::AlreadyConnected);
    }
    tracing::info!(room = %room_id, participant = %caller_id, "participant joined");

    outbox.broadcast_except(
        room,
        caller_id,
        Event::UserJoined(RoomNoticeBroadcastEvent {
            room: String::from(room_id),
            user_id: String::from(caller_id),
            message: format!("User {} has joined the room.", caller_id),
        }),
    );
    outbox.membership(room);
    outbox.reply(
        caller_id,
        Event::JoinRoomResult(JoinRoomReplyEvent {
            room: String::from(room_id),
            success: true,
            error: None,
        }),
    );

    Ok(())
}

fn vote(
    registry: &mut SessionRegistry,
    outbox: &mut Outbox,
    caller_id: &str,
    room_id: &str,
    vote: String,
) -> Result<(), CommandRejection> {
    let room = registry
        .get_mut(room_id)
        .ok()
        .filter(|room| room.is_member(caller_id))
        .ok_or(CommandRejection::NotInRoom)?;

    room.record_vote(caller_id, vote);
    outbox.broadcast(
        room,
        Event::NewVote(RoomNoticeBroadcastEvent {
            room: String::from(room_id),
            user_id: String::from(caller_id),
            message: format!("User {} has voted.", caller_id),
        }),
    );

    Ok(())
}

/// The room if `caller_id` is its admin, a missing room has no admin
fn admin_room<'a>(
    registry: &'a mut SessionRegistry,
    caller_id: &str,
    room_id: &str,
    action: AdminAction,
) -> Result<&'a mut PokerRoom, CommandRejection> {
    registry
        .get_mut(room_id)
        .ok()
        .filter(|room| room.is_admin(caller_id))
        .ok_or(CommandRejection::NotAdmin(action))
}

fn reveal_votes(
    registry: &mut SessionRegistry,
    outbox: &mut Outbox,
    caller_id: &str,
    room_id: &str,
) -> Result<(), CommandRejection> {
    let room = admin_room(registry, caller_id, room_id, AdminAction::RevealVotes)?;

    outbox.broadcast(
        room,
        Event::VotesRevealed(VotesRevealedBroadcastEvent {
            room: String::from(room_id),
            votes: room.reveal_votes(),
        }),
    );

    Ok(())
}

fn kick_user(
    registry: &mut SessionRegistry,
    outbox: &mut Outbox,
    caller_id: &str,
    room_id: &str,
    target_id: &str,
) -> Result<(), CommandRejection> {
    let room = admin_room(registry, caller_id, room_id, AdminAction::KickUsers)?;
    if target_id == caller_id {
        return Err(CommandRejection::SelfKick);
    }
    if !room.is_member(target_id) {
        return Err(CommandRejection::TargetNotInRoom);
    }

    outbox.reply(
        target_id,
        Event::Kicked(KickedReplyEvent {
            room: String::from(room_id),
            message: String::from("You have been kicked from the room"),
        }),
    );
    // the admin stays behind, so a kick never empties the room
    room.remove_member(target_id);
    tracing::info!(room = %room_id, participant = %target_id, "participant kicked");

    outbox.broadcast(
        room,
        Event::UserKicked(RoomNoticeBroadcastEvent {
            room: String::from(room_id),
            user_id: String::from(target_id),
            message: format!("User {} has been kicked from the room", target_id),
        }),
    );
    outbox.membership(room);

    Ok(())
}

fn clear_votes(
    registry: &mut SessionRegistry,
    outbox: &mut Outbox,
    caller_id: &str,
    room_id: &str,
) -> Result<(), CommandRejection> {
    let room = admin_room(registry, caller_id, room_id, AdminAction::ClearVotes)?;

    room.clear_votes();
    outbox.broadcast(
        room,
        Event::VotesCleared(VotesClearedBroadcastEvent {
            room: String::from(room_id),
        }),
    );

    Ok(())
}
