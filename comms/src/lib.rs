/// Set of commands which the poker server can receive and process
pub mod command;
/// Set of events split into Broadcast and Reply events according to their recipients
pub mod event;
/// Implementation of event and command transportation over TCP Streams as newline delimited JSON.
/// Requires 'server' or 'client' features to be enabled and will bring in tokio dependency alongside with other dependencies
pub mod transport;
