use std::collections::BTreeMap;

use super::{
    admin_policy::AdminSeat,
    member_registry::{Admission, Departure, MemberRegistry},
    vote_ledger::VoteLedger,
};

#[derive(Debug)]
/// [PokerRoom] is the state of a single planning poker room:
/// who is in it, who holds the admin rights and what has been voted so far.
///
/// A room is only ever handed out by the [crate::registry::SessionRegistry] which owns it,
/// mutating it mutates the registry state.
pub struct PokerRoom {
    id: String,
    members: MemberRegistry,
    admin: AdminSeat,
    votes: VoteLedger,
}

impl PokerRoom {
    /// A fresh room with the creator as its sole member and admin
    pub(crate) fn new(id: &str, creator_id: &str) -> Self {
        let mut members = MemberRegistry::new();
        members.insert(creator_id);

        PokerRoom {
            id: String::from(id),
            members,
            admin: AdminSeat::assign_initial(creator_id),
            votes: VoteLedger::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_member(&self, participant_id: &str) -> bool {
        self.members.contains(participant_id)
    }

    pub fn member_ids(&self) -> Vec<String> {
        self.members.snapshot()
    }

    pub fn admin_id(&self) -> &str {
        self.admin.holder()
    }

    pub fn is_admin(&self, participant_id: &str) -> bool {
        self.admin.is_admin(participant_id)
    }

    pub fn add_member(&mut self, participant_id: &str) -> Admission {
        self.members.insert(participant_id)
    }

    /// Remove a participant along with its vote
    ///
    /// Admin rights are not touched here, see [PokerRoom::reassign_admin_if_needed].
    pub fn remove_member(&mut self, participant_id: &str) -> Departure {
        let departure = self.members.remove(participant_id);
        if departure == Departure::Removed {
            self.votes.purge(participant_id);
        }

        departure
    }

    /// Returns the new admin if the departing participant was the admin and someone is left
    pub fn reassign_admin_if_needed(&mut self, departing_id: &str) -> Option<String> {
        self.admin
            .reassign_if_needed(departing_id, &self.members)
            .map(String::from)
    }

    pub fn record_vote(&mut self, participant_id: &str, vote: String) {
        self.votes.record(participant_id, vote);
    }

    pub fn reveal_votes(&self) -> BTreeMap<String, String> {
        self.votes.reveal()
    }

    pub fn clear_votes(&mut self) {
        self.votes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creator_is_sole_member_and_admin() {
        let room = PokerRoom::new("sprint1", "a");

        assert_eq!(room.member_ids(), vec!["a"]);
        assert_eq!(room.admin_id(), "a");
        assert!(room.reveal_votes().is_empty());
    }

    #[test]
    fn test_departed_member_vote_is_purged() {
        let mut room = PokerRoom::new("sprint1", "a");
        room.add_member("b");
        room.record_vote("a", "5".into());
        room.record_vote("b", "8".into());

        assert_eq!(room.remove_member("b"), Departure::Removed);
        assert_eq!(
            room.reveal_votes(),
            BTreeMap::from([("a".into(), "5".into())])
        );
    }

    #[test]
    fn test_admin_succession_after_removal() {
        let mut room = PokerRoom::new("sprint1", "a");
        room.add_member("b");
        room.add_member("c");

        room.remove_member("a");

        assert_eq!(room.reassign_admin_if_needed("a"), Some("b".into()));
        assert!(room.is_admin("b"));
        assert_eq!(room.size(), 2);
    }
}
