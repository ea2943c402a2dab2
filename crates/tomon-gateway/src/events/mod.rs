//! Gateway events
//!
//! Typed inbound events: the documented event types, the payload context,
//! and the closed set of categories events are emitted under.

mod context;
mod event;
mod event_types;

pub use context::{Author, EventContext};
pub use event::{names, EventKind, GatewayEvent, InboundEvent};
pub use event_types::GatewayEventType;
