//! Inbound events and their bus names

use super::{EventContext, GatewayEventType};
use crate::protocol::{GatewayFrame, OpCode};
use serde_json::Value;

/// Bus event names
pub mod names {
    /// Root of all message events
    pub const MESSAGE: &str = "message";
    /// A message posted in a channel
    pub const MESSAGE_CHANNEL: &str = "message.channel";
    /// Root of all notice events
    pub const NOTICE: &str = "notice";
    /// A user's online status changed
    pub const NOTICE_ONLINE: &str = "notice.online";
    /// Everything else
    pub const OTHER: &str = "other";
    /// Root of all outbound REST actions
    pub const SEND: &str = "send";
}

/// A decoded frame that passed the echo filter
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub op: OpCode,
    /// Dispatch event type (`t`), present only for DISPATCH frames
    pub event_type: Option<String>,
    pub data: Option<Value>,
}

impl InboundEvent {
    /// Accept a frame unless it echoes one of our own actions
    #[must_use]
    pub fn from_frame(frame: GatewayFrame) -> Option<Self> {
        if frame.is_echo() {
            return None;
        }

        Some(Self {
            op: frame.op,
            event_type: frame.t,
            data: frame.d,
        })
    }

    /// Decode a raw text message
    ///
    /// Returns `None` for malformed frames as well as for echoes.
    #[must_use]
    pub fn decode(text: &str) -> Option<Self> {
        GatewayFrame::from_json(text).ok().and_then(Self::from_frame)
    }
}

/// Category of an inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Online status change
    Presence,
    /// Message posted in a channel
    ChannelMessage,
    /// Anything else
    Other,
}

impl EventKind {
    /// Classify an event
    ///
    /// Documented event types decide directly; undocumented or absent types
    /// fall back to the payload shape (`status` first, then `content`).
    #[must_use]
    pub fn classify(event_type: Option<&str>, context: &EventContext) -> Self {
        match event_type.and_then(GatewayEventType::parse) {
            Some(GatewayEventType::UserPresenceUpdate) => Self::Presence,
            Some(GatewayEventType::MessageCreate | GatewayEventType::MessageUpdate) => {
                Self::ChannelMessage
            }
            Some(_) => Self::Other,
            None if context.has_status() => Self::Presence,
            None if context.text().is_some() => Self::ChannelMessage,
            None => Self::Other,
        }
    }

    /// Name the event is emitted under on the bus
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Presence => names::NOTICE_ONLINE,
            Self::ChannelMessage => names::MESSAGE_CHANNEL,
            Self::Other => names::OTHER,
        }
    }
}

/// A typed inbound event, as delivered to bus handlers
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayEvent {
    pub op: OpCode,
    pub event_type: Option<String>,
    pub kind: EventKind,
    pub context: EventContext,
}

impl GatewayEvent {
    /// Translate an inbound frame into its typed form
    #[must_use]
    pub fn from_inbound(inbound: InboundEvent) -> Self {
        let context = EventContext::from_value(inbound.data);
        let kind = EventKind::classify(inbound.event_type.as_deref(), &context);

        Self {
            op: inbound.op,
            event_type: inbound.event_type,
            kind,
            context,
        }
    }

    /// Build a channel message event directly (tests, local injection)
    #[must_use]
    pub fn channel_message(context: EventContext) -> Self {
        Self {
            op: OpCode::Dispatch,
            event_type: Some(GatewayEventType::MessageCreate.as_str().to_string()),
            kind: EventKind::ChannelMessage,
            context,
        }
    }

    /// Name the event is emitted under on the bus
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.event_name()
    }

    /// Log label for the event type
    #[must_use]
    pub fn describe(&self) -> &str {
        match (self.event_type.as_deref(), self.known()) {
            (_, Some(known)) => known.description(),
            (Some(raw), None) => raw,
            (None, None) => self.op.description(),
        }
    }

    fn known(&self) -> Option<GatewayEventType> {
        self.event_type.as_deref().and_then(GatewayEventType::parse)
    }
}
