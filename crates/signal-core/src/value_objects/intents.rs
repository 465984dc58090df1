//! Gateway intents bitflags
//!
//! Declares which categories of events the session subscribes to. The mask is sent
//! with Identify and also consulted locally to discard categories not subscribed to.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Gateway intent flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GatewayIntents: u32 {
        /// Guild create/update/delete, roles, channels
        const GUILDS                        = 1 << 0;
        /// Member add/update/remove (privileged)
        const GUILD_MEMBERS                 = 1 << 1;
        /// Bans and audit log entries
        const GUILD_MODERATION              = 1 << 2;
        /// Emoji and sticker updates
        const GUILD_EMOJIS_AND_STICKERS     = 1 << 3;
        /// Integration updates
        const GUILD_INTEGRATIONS            = 1 << 4;
        /// Webhook updates
        const GUILD_WEBHOOKS                = 1 << 5;
        /// Invite create/delete
        const GUILD_INVITES                 = 1 << 6;
        /// Voice state updates
        const GUILD_VOICE_STATES            = 1 << 7;
        /// Presence updates (privileged)
        const GUILD_PRESENCES               = 1 << 8;
        /// Guild message create/update/delete
        const GUILD_MESSAGES                = 1 << 9;
        /// Guild message reaction add/remove
        const GUILD_MESSAGE_REACTIONS       = 1 << 10;
        /// Guild typing start
        const GUILD_MESSAGE_TYPING          = 1 << 11;
        /// Direct messages
        const DIRECT_MESSAGES               = 1 << 12;
        /// Direct message reactions
        const DIRECT_MESSAGE_REACTIONS      = 1 << 13;
        /// Direct message typing
        const DIRECT_MESSAGE_TYPING         = 1 << 14;
        /// Message content (privileged)
        const MESSAGE_CONTENT               = 1 << 15;

        /// Categories a signal device subscribes to out of the box
        const SIGNAL_DEFAULT = Self::GUILD_MESSAGES.bits()
            | Self::GUILD_MESSAGE_TYPING.bits()
            | Self::GUILD_VOICE_STATES.bits()
            | Self::GUILD_MESSAGE_REACTIONS.bits()
            | Self::GUILD_MEMBERS.bits();
    }
}

impl GatewayIntents {
    /// Intents that require explicit approval on the application
    pub const PRIVILEGED: Self = Self::GUILD_MEMBERS
        .union(Self::GUILD_PRESENCES)
        .union(Self::MESSAGE_CONTENT);

    /// Check whether every intent in `required` is enabled
    #[inline]
    pub fn allows(&self, required: GatewayIntents) -> bool {
        self.contains(required)
    }

    /// Check whether the mask requests any privileged intent
    #[inline]
    pub fn is_privileged(&self) -> bool {
        self.intersects(Self::PRIVILEGED)
    }

    /// Parse from string representation (decimal number)
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        s.trim().parse::<u32>().map(GatewayIntents::from_bits_truncate)
    }

    /// Get a list of all individual intents that are set
    pub fn list(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl Default for GatewayIntents {
    fn default() -> Self {
        GatewayIntents::SIGNAL_DEFAULT
    }
}

impl fmt::Display for GatewayIntents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

// Identify expects the mask as a plain integer
impl Serialize for GatewayIntents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for GatewayIntents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(GatewayIntents::from_bits_truncate(bits))
    }
}

impl From<u32> for GatewayIntents {
    fn from(bits: u32) -> Self {
        GatewayIntents::from_bits_truncate(bits)
    }
}

impl From<GatewayIntents> for u32 {
    fn from(intents: GatewayIntents) -> Self {
        intents.bits()
    }
}
