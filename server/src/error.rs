use std::fmt;

/// Commands only the admin of a room may issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    RevealVotes,
    KickUsers,
    ClearVotes,
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminAction::RevealVotes => f.write_str("reveal votes"),
            AdminAction::KickUsers => f.write_str("kick users"),
            AdminAction::ClearVotes => f.write_str("clear votes"),
        }
    }
}

/// A command whose preconditions do not hold against the current room state.
///
/// A rejection is reported to the participant who sent the command and nobody else,
/// the room state is left untouched. The [fmt::Display] output is the text sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandRejection {
    #[error("Room id must not be empty")]
    EmptyRoomId,
    #[error("Room already exists")]
    RoomAlreadyExists,
    #[error("Room does not exist")]
    RoomDoesNotExist,
    #[error("You are already connected to this room")]
    AlreadyConnected,
    #[error("You are not in this room")]
    NotInRoom,
    #[error("Only the admin can {0}")]
    NotAdmin(AdminAction),
    #[error("Admin cannot kick itself")]
    SelfKick,
    #[error("User not found in the room")]
    TargetNotInRoom,
}
