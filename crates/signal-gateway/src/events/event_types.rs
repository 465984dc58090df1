//! Dispatch event names
//!
//! The `t` values this client acts on. Dispatches with any other name decode
//! as unknown and are dropped.

use signal_core::GatewayIntents;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayEventType {
    /// Handshake finished; carries the session id
    Ready,
    /// Resume accepted; replayed events follow
    Resumed,
    MessageCreate,
    MessageReactionAdd,
    MessageReactionRemove,
    /// Role or nickname change
    GuildMemberUpdate,
    PresenceUpdate,
    TypingStart,
    /// Voice channel join, leave or move
    VoiceStateUpdate,
}

impl GatewayEventType {
    const ALL: [Self; 9] = [
        Self::Ready,
        Self::Resumed,
        Self::MessageCreate,
        Self::MessageReactionAdd,
        Self::MessageReactionRemove,
        Self::GuildMemberUpdate,
        Self::PresenceUpdate,
        Self::TypingStart,
        Self::VoiceStateUpdate,
    ];

    /// Wire name, as sent in `t`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Resumed => "RESUMED",
            Self::MessageCreate => "MESSAGE_CREATE",
            Self::MessageReactionAdd => "MESSAGE_REACTION_ADD",
            Self::MessageReactionRemove => "MESSAGE_REACTION_REMOVE",
            Self::GuildMemberUpdate => "GUILD_MEMBER_UPDATE",
            Self::PresenceUpdate => "PRESENCE_UPDATE",
            Self::TypingStart => "TYPING_START",
            Self::VoiceStateUpdate => "VOICE_STATE_UPDATE",
        }
    }

    /// Exact, case-sensitive lookup of a wire name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.as_str() == name)
    }

    /// Intent that must be enabled for this event to be acted on
    ///
    /// Session lifecycle events need no intent.
    #[must_use]
    pub const fn required_intent(self) -> Option<GatewayIntents> {
        match self {
            Self::Ready | Self::Resumed => None,
            Self::MessageCreate => Some(GatewayIntents::GUILD_MESSAGES),
            Self::MessageReactionAdd | Self::MessageReactionRemove => {
                Some(GatewayIntents::GUILD_MESSAGE_REACTIONS)
            }
            Self::GuildMemberUpdate => Some(GatewayIntents::GUILD_MEMBERS),
            Self::PresenceUpdate => Some(GatewayIntents::GUILD_PRESENCES),
            Self::TypingStart => Some(GatewayIntents::GUILD_MESSAGE_TYPING),
            Self::VoiceStateUpdate => Some(GatewayIntents::GUILD_VOICE_STATES),
        }
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
