/// Client side of the TCP transport, reads events and writes commands
#[cfg(feature = "client")]
pub mod client;
#[cfg(any(feature = "client", feature = "server"))]
mod common;
/// Server side of the TCP transport for a single accepted participant connection
#[cfg(feature = "server")]
pub mod server;
