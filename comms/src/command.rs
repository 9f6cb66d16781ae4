use serde::{Deserialize, Serialize};

/// User Command for creating a new room, the sender becomes its admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRoomCommand {
    // The room to create.
    #[serde(rename = "r")]
    pub room: String,
}

/// User Command for joining an existing room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRoomCommand {
    // The room to join.
    #[serde(rename = "r")]
    pub room: String,
}

/// User Command for listing the rooms which are currently active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetActiveRoomsCommand;

/// User Command for casting (or replacing) a hidden vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteCommand {
    // The room to vote in.
    #[serde(rename = "r")]
    pub room: String,
    // The vote, opaque to the server.
    #[serde(rename = "v")]
    pub vote: String,
}

/// Admin Command for revealing every vote of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealVotesCommand {
    #[serde(rename = "r")]
    pub room: String,
}

/// Admin Command for removing another participant from a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KickUserCommand {
    #[serde(rename = "r")]
    pub room: String,
    // The participant id of the user to kick.
    #[serde(rename = "u")]
    pub user_id: String,
}

/// Admin Command for resetting the votes of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearVotesCommand {
    #[serde(rename = "r")]
    pub room: String,
}

/// User Command for quitting the whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuitCommand;

/// A user command which can be sent to the server by a single connection.
/// All commands are processed in the context of the poker server paired with an individual participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_ct", rename_all = "snake_case")]
pub enum UserCommand {
    CreateRoom(CreateRoomCommand),
    JoinRoom(JoinRoomCommand),
    GetActiveRooms(GetActiveRoomsCommand),
    Vote(VoteCommand),
    RevealVotes(RevealVotesCommand),
    KickUser(KickUserCommand),
    ClearVotes(ClearVotesCommand),
    Quit(QuitCommand),
}
