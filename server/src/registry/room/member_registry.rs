/// Outcome of adding a participant to a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Added,
    AlreadyMember,
}

/// Outcome of removing a participant from a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    Removed,
    NotAMember,
}

/// [MemberRegistry] keeps track of which participants are in a room
///
/// Members are kept in the order they joined, the order is what admin succession is based on.
/// A participant is in the registry at most once.
#[derive(Debug, Default)]
pub struct MemberRegistry {
    members: Vec<String>,
}

impl MemberRegistry {
    pub fn new() -> Self {
        MemberRegistry {
            members: Vec::new(),
        }
    }

    pub fn contains(&self, participant_id: &str) -> bool {
        self.members.iter().any(|member| member == participant_id)
    }

    /// Add a participant, reports [Admission::AlreadyMember] instead of adding it twice
    pub fn insert(&mut self, participant_id: &str) -> Admission {
        if self.contains(participant_id) {
            return Admission::AlreadyMember;
        }

        self.members.push(String::from(participant_id));

        Admission::Added
    }

    /// Removes a participant, does nothing and returns [Departure::NotAMember] if it is not in the room
    pub fn remove(&mut self, participant_id: &str) -> Departure {
        match self.members.iter().position(|member| member == participant_id) {
            Some(index) => {
                self.members.remove(index);

                Departure::Removed
            }
            None => Departure::NotAMember,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The longest standing member
    pub fn first(&self) -> Option<&str> {
        self.members.first().map(String::as_str)
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.members.clone()
    }
}
