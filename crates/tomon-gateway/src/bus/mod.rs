//! Event bus
//!
//! Hierarchical publish/subscribe with pre-processing hooks.

mod bus;
mod handler;

pub use bus::{levels, Emission, EventBus};
pub use handler::{Handler, HandlerResult};
