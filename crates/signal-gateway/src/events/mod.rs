//! Gateway events
//!
//! Dispatch event names and the payloads this client decodes.

mod event_types;
mod payloads;

pub use event_types::GatewayEventType;
pub use payloads::{
    EmojiPayload, GuildMemberUpdateEvent, MemberPayload, MessageCreateEvent,
    MessageReactionEvent, PresenceEvent, PresenceStatus, ReadyEvent, TypingStartEvent,
    UserRef, VoiceStateEvent,
};
