//! Gateway connection
//!
//! The socket session: handshake, heartbeat, read loop and the state it
//! moves through.

mod connection;
mod heartbeat;
mod state;
mod transport;

pub use connection::{ConnectionSettings, GatewayConnection};
pub use state::{ConnectionState, StateTracker};
