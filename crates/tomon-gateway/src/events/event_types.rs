//! Dispatch event types known to the platform
//!
//! Values of the `t` field of DISPATCH frames. Unknown values are not an
//! error: the frame is still delivered, classified by payload shape.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! event_types {
    ($($variant:ident => $wire:literal, $description:literal;)+) => {
        /// A known dispatch event type
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum GatewayEventType {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl GatewayEventType {
            /// Every known event type, in protocol order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire form, as carried in `t`
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// Short description used in per-event log lines
            #[must_use]
            pub const fn description(self) -> &'static str {
                match self {
                    $(Self::$variant => $description,)+
                }
            }
        }
    };
}

event_types! {
    GuildCreate => "GUILD_CREATE", "guild created or joined";
    GuildDelete => "GUILD_DELETE", "guild deleted or left";
    GuildUpdate => "GUILD_UPDATE", "guild updated";
    GuildPosition => "GUILD_POSITION", "guild position changed";
    ChannelCreate => "CHANNEL_CREATE", "channel created";
    ChannelDelete => "CHANNEL_DELETE", "channel deleted";
    ChannelUpdate => "CHANNEL_UPDATE", "channel updated";
    ChannelPosition => "CHANNEL_POSITION", "channel position changed";
    GuildRoleCreate => "GUILD_ROLE_CREATE", "guild role created";
    GuildRoleDelete => "GUILD_ROLE_DELETE", "guild role deleted";
    GuildRoleUpdate => "GUILD_ROLE_UPDATE", "guild role updated";
    GuildRolePosition => "GUILD_ROLE_POSITION", "guild role position changed";
    GuildMemberAdd => "GUILD_MEMBER_ADD", "guild member added";
    GuildMemberRemove => "GUILD_MEMBER_REMOVE", "guild member removed";
    GuildMemberUpdate => "GUILD_MEMBER_UPDATE", "guild member updated";
    MessageCreate => "MESSAGE_CREATE", "message created";
    MessageDelete => "MESSAGE_DELETE", "message deleted";
    MessageUpdate => "MESSAGE_UPDATE", "message updated";
    MessageReactionAdd => "MESSAGE_REACTION_ADD", "reaction added";
    MessageReactionRemove => "MESSAGE_REACTION_REMOVE", "reaction removed";
    MessageReactionRemoveAll => "MESSAGE_REACTION_REMOVE_ALL", "all reactions removed";
    EmojiCreate => "EMOJI_CREATE", "guild emoji created";
    EmojiDelete => "EMOJI_DELETE", "guild emoji deleted";
    EmojiUpdate => "EMOJI_UPDATE", "guild emoji updated";
    VoiceStateUpdate => "VOICE_STATE_UPDATE", "voice state updated";
    UserTyping => "USER_TYPING", "user typing";
    UserPresenceUpdate => "USER_PRESENCE_UPDATE", "presence updated";
}

impl GatewayEventType {
    /// Look up a wire name; `None` for types this client does not know
    #[must_use]
    pub fn parse(wire: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|event| event.as_str() == wire)
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
