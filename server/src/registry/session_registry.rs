use std::collections::HashMap;

use crate::error::CommandRejection;

use super::room::PokerRoom;

/// [SessionRegistry] owns every live room, keyed by the room id chosen by its creator
///
/// A room is in the registry only while it has at least one member.
/// The registry does no I/O, callers are expected to serialize access to it.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    rooms: HashMap<String, PokerRoom>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry {
            rooms: HashMap::new(),
        }
    }

    /// Creates a room with the creator as its sole member and admin
    /// Rejects the request if a room with the same id is live, the existing room is left as is
    pub fn create_room(
        &mut self,
        room_id: &str,
        creator_id: &str,
    ) -> Result<&mut PokerRoom, CommandRejection> {
        if room_id.is_empty() {
            return Err(CommandRejection::EmptyRoomId);
        }

        if self.rooms.contains_key(room_id) {
            return Err(CommandRejection::RoomAlreadyExists);
        }

        Ok(self
            .rooms
            .entry(String::from(room_id))
            .or_insert_with(|| PokerRoom::new(room_id, creator_id)))
    }

    pub fn exists(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn get(&self, room_id: &str) -> Result<&PokerRoom, CommandRejection> {
        self.rooms
            .get(room_id)
            .ok_or(CommandRejection::RoomDoesNotExist)
    }

    pub fn get_mut(&mut self, room_id: &str) -> Result<&mut PokerRoom, CommandRejection> {
        self.rooms
            .get_mut(room_id)
            .ok_or(CommandRejection::RoomDoesNotExist)
    }

    /// Snapshot of the live room ids, sorted for stable display
    pub fn list_room_ids(&self) -> Vec<String> {
        let mut room_ids: Vec<String> = self.rooms.keys().cloned().collect();
        room_ids.sort();

        room_ids
    }

    /// Ids of the rooms the participant is currently a member of
    pub fn rooms_of(&self, participant_id: &str) -> Vec<String> {
        let mut room_ids: Vec<String> = self
            .rooms
            .values()
            .filter(|room| room.is_member(participant_id))
            .map(|room| String::from(room.id()))
            .collect();
        room_ids.sort();

        room_ids
    }

    /// Drops the room together with its votes and admin record if nobody is left in it.
    /// Returns true if the room was deleted.
    pub fn delete_if_empty(&mut self, room_id: &str) -> bool {
        match self.rooms.get(room_id) {
            Some(room) if room.is_empty() => {
                self.rooms.remove(room_id);
                true
            }
            _ => false,
        }
    }
}
