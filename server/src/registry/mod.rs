pub use self::room::{Admission, Departure, PokerRoom};
pub use self::session_registry::SessionRegistry;

mod room;
mod session_registry;
