use super::member_registry::MemberRegistry;

/// [AdminSeat] records which member of a room holds the admin rights
///
/// The creator of a room takes the seat. When the holder leaves and members remain,
/// the seat passes to the longest standing member.
#[derive(Debug, Clone)]
pub struct AdminSeat {
    holder: String,
}

impl AdminSeat {
    pub fn assign_initial(creator_id: &str) -> Self {
        AdminSeat {
            holder: String::from(creator_id),
        }
    }

    pub fn holder(&self) -> &str {
        &self.holder
    }

    pub fn is_admin(&self, participant_id: &str) -> bool {
        self.holder == participant_id
    }

    /// Elect a successor when the departing participant held the seat
    ///
    /// Must be called after the departing participant has been removed from `remaining`.
    /// Returns the new admin, or `None` when the seat did not change hands
    /// (the departing participant was not the admin, or nobody is left).
    pub fn reassign_if_needed(
        &mut self,
        departing_id: &str,
        remaining: &MemberRegistry,
    ) -> Option<&str> {
        if !self.is_admin(departing_id) {
            return None;
        }

        let successor = remaining.first()?;
        self.holder = String::from(successor);

        Some(&self.holder)
    }
}
