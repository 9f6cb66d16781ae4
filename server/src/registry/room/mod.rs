mod admin_policy;
mod member_registry;
mod poker_room;
mod vote_ledger;

pub use self::member_registry::{Admission, Departure};
pub use self::poker_room::PokerRoom;
