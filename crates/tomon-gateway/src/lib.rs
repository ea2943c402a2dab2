//! # tomon-gateway
//!
//! Realtime gateway client for the Tomon chat platform.
//!
//! - [`protocol`]: frame format and op codes
//! - [`events`]: typed inbound events and their bus names
//! - [`bus`]: hierarchical event bus with pre-processing hooks
//! - [`connection`]: the gateway connection state machine
//! - [`supervisor`]: the reconnect loop
//! - [`bot`]: the handle applications and plugins register through

pub mod bot;
pub mod bus;
pub mod connection;
pub mod error;
pub mod events;
pub mod protocol;
pub mod supervisor;

pub use bot::{Bot, BotBuilder, Plugin, StageHooks};
pub use bus::{Emission, EventBus, Handler, HandlerResult};
pub use connection::{ConnectionSettings, ConnectionState, GatewayConnection};
pub use error::{GatewayError, GatewayResult};
pub use events::{names, EventContext, EventKind, GatewayEvent, GatewayEventType};
pub use supervisor::{Reconnectable, Supervisor};
