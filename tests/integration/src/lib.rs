//! Integration test utilities for the bot client
//!
//! This crate provides a scripted gateway server and a mock REST API so
//! the client can be driven end to end over real sockets.


pub use fixtures::*;
pub use helpers::*;
