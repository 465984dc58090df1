//! Dispatch bodies
//!
//! Only the fields the dispatcher reads are modelled; everything else in a
//! payload is ignored during decoding.

use serde::{Deserialize, Serialize};
use signal_core::Snowflake;

/// Body of READY
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyEvent {
    #[serde(default)]
    pub v: u8,

    /// The bot's own user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,

    pub session_id: String,

    /// Host to dial when resuming this session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_gateway_url: Option<String>,
}

/// Partial user object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    pub id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Guild member data included in events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberPayload {
    #[serde(default)]
    pub roles: Vec<Snowflake>,
}

/// Emoji data included in reaction events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmojiPayload {
    /// Custom emoji id; `None` for unicode emoji
    #[serde(default)]
    pub id: Option<Snowflake>,
    /// Emoji name, or the unicode character itself
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of MESSAGE_CREATE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreateEvent {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<UserRef>,
    #[serde(default)]
    pub mention_roles: Vec<Snowflake>,
}

/// Body of both reaction events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReactionEvent {
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    /// Only present on reaction add
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberPayload>,
    pub emoji: EmojiPayload,
}

impl MessageReactionEvent {
    /// Roles of the reacting member, empty when the payload carries none
    #[must_use]
    pub fn member_roles(&self) -> &[Snowflake] {
        self.member.as_ref().map_or(&[], |m| m.roles.as_slice())
    }
}

/// Body of GUILD_MEMBER_UPDATE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildMemberUpdateEvent {
    pub guild_id: Snowflake,
    pub user: UserRef,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
}

/// User status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Idle,
    Dnd,
    Offline,
    Invisible,
}

impl PresenceStatus {
    /// Whether the user shows as present
    #[must_use]
    pub const fn is_present(self) -> bool {
        matches!(self, Self::Online | Self::Idle | Self::Dnd)
    }
}

/// Body of PRESENCE_UPDATE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceEvent {
    pub user: UserRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    pub status: PresenceStatus,
}

/// Body of TYPING_START
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingStartEvent {
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    pub user_id: Snowflake,
    #[serde(default)]
    pub timestamp: u64,
}

/// Body of VOICE_STATE_UPDATE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceStateEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    /// Channel joined; `None` when the user left voice
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    pub user_id: Snowflake,
}

impl VoiceStateEvent {
    #[must_use]
    pub fn is_leave(&self) -> bool {
        self.channel_id.is_none()
    }
}
