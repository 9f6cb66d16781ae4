use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sent once to a freshly accepted connection, carrying the participant id
/// the server assigned to it for the lifetime of the connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectedReplyEvent {
    #[serde(rename = "p")]
    pub participant_id: String,
}

/// The room requested by the user has been created, the user is its admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomCreatedReplyEvent {
    #[serde(rename = "r")]
    pub room: String,
}

/// Outcome of a join attempt, sent only to the user who tried to join
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRoomReplyEvent {
    #[serde(rename = "r")]
    pub room: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Snapshot of the room ids which currently have at least one member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveRoomsReplyEvent {
    pub rooms: Vec<String>,
}

/// The receiving user has been kicked from a room by its admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KickedReplyEvent {
    #[serde(rename = "r")]
    pub room: String,
    #[serde(rename = "m")]
    pub message: String,
}

/// A command of the receiving user has been rejected, nothing was changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReplyEvent {
    #[serde(rename = "m")]
    pub message: String,
}

/// Number of members currently in a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCountBroadcastEvent {
    #[serde(rename = "r")]
    pub room: String,
    #[serde(rename = "n")]
    pub count: usize,
}

/// The participant which holds the admin rights of a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminAssignedBroadcastEvent {
    #[serde(rename = "r")]
    pub room: String,
    #[serde(rename = "u")]
    pub user_id: String,
}

/// Participant ids of every member of a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListBroadcastEvent {
    #[serde(rename = "r")]
    pub room: String,
    pub users: Vec<String>,
}

/// Human readable notice about something a user did in a room
/// Used for joins, cast votes and kicks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomNoticeBroadcastEvent {
    #[serde(rename = "r")]
    pub room: String,
    /// The user the notice is about
    #[serde(rename = "u")]
    pub user_id: String,
    #[serde(rename = "m")]
    pub message: String,
}

/// Every vote recorded in a room, keyed by participant id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotesRevealedBroadcastEvent {
    #[serde(rename = "r")]
    pub room: String,
    pub votes: BTreeMap<String, String>,
}

/// The votes of a room have been reset by its admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotesClearedBroadcastEvent {
    #[serde(rename = "r")]
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
/// Events that can be sent to the client
/// Reply events answer a command of the recipient, broadcast events are sent to every member of a room
pub enum Event {
    Connected(ConnectedReplyEvent),
    RoomCreated(RoomCreatedReplyEvent),
    JoinRoomResult(JoinRoomReplyEvent),
    ActiveRooms(ActiveRoomsReplyEvent),
    Kicked(KickedReplyEvent),
    Error(ErrorReplyEvent),
    UserCount(UserCountBroadcastEvent),
    AdminAssigned(AdminAssignedBroadcastEvent),
    UserList(UserListBroadcastEvent),
    UserJoined(RoomNoticeBroadcastEvent),
    NewVote(RoomNoticeBroadcastEvent),
    UserKicked(RoomNoticeBroadcastEvent),
    VotesRevealed(VotesRevealedBroadcastEvent),
    VotesCleared(VotesClearedBroadcastEvent),
}

impl Event {
    /// Shorthand for the generic error reply
    pub fn error(message: impl Into<String>) -> Self {
        Event::Error(ErrorReplyEvent {
            message: message.into(),
        })
    }
}
