use std::collections::{BTreeMap, HashMap};

/// [VoteLedger] holds the latest vote of every participant of a room
#[derive(Debug, Default)]
pub struct VoteLedger {
    votes: HashMap<String, String>,
}

impl VoteLedger {
    pub fn new() -> Self {
        VoteLedger {
            votes: HashMap::new(),
        }
    }

    /// Last write wins, returns the vote that got replaced
    pub fn record(&mut self, participant_id: &str, vote: String) -> Option<String> {
        self.votes.insert(String::from(participant_id), vote)
    }

    /// Drop the vote of a participant that left the room
    pub fn purge(&mut self, participant_id: &str) -> Option<String> {
        self.votes.remove(participant_id)
    }

    pub fn reveal(&self) -> BTreeMap<String, String> {
        self.votes
            .iter()
            .map(|(participant_id, vote)| (participant_id.clone(), vote.clone()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }
}
