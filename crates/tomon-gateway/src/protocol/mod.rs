//! Gateway protocol definitions
//!
//! Defines the WebSocket protocol: op codes, the frame format, and payloads.

mod frames;
mod opcodes;
mod payloads;

pub use frames::GatewayFrame;
pub use opcodes::{OpCode, UnknownOpCode};
pub use payloads::IdentifyPayload;
