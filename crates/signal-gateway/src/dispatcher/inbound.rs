//! Inbound frame decoding

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::events::{
    GatewayEventType, GuildMemberUpdateEvent, MessageCreateEvent, MessageReactionEvent,
    PresenceEvent, ReadyEvent, TypingStartEvent, VoiceStateEvent,
};
use crate::protocol::{GatewayMessage, HelloPayload, OpCode};

/// Payload decoding errors; the offending frame is dropped
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed Hello payload")]
    MalformedHello,

    #[error("Dispatch without an event type")]
    MissingEventType,

    #[error("Malformed {event} payload: {source}")]
    MalformedPayload {
        event: GatewayEventType,
        #[source]
        source: serde_json::Error,
    },
}

/// A decoded server frame
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Hello(HelloPayload),
    HeartbeatAck,
    /// Server asks for an immediate heartbeat
    HeartbeatRequest,
    /// Server asks the client to reconnect and resume
    Reconnect,
    InvalidSession { resumable: bool },
    Dispatch(DispatchEvent),
    /// Op code this client does not handle
    Unknown { op: OpCode },
}

/// A decoded dispatch (op 0) payload
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    Ready(ReadyEvent),
    Resumed,
    MessageCreate(MessageCreateEvent),
    ReactionAdd(MessageReactionEvent),
    ReactionRemove(MessageReactionEvent),
    MemberUpdate(GuildMemberUpdateEvent),
    Presence(PresenceEvent),
    TypingStart(TypingStartEvent),
    VoiceState(VoiceStateEvent),
    /// Event name this client does not handle
    Unknown { name: String },
}

/// Longest heartbeat interval accepted from Hello
pub const MAX_HEARTBEAT_INTERVAL_MS: u64 = 5 * 60 * 1_000;

fn payload<T: DeserializeOwned>(
    event: GatewayEventType,
    data: Option<Value>,
) -> Result<T, DecodeError> {
    serde_json::from_value(data.unwrap_or(Value::Null))
        .map_err(|source| DecodeError::MalformedPayload { event, source })
}

impl InboundEvent {
    /// Decode a parsed envelope into a typed event
    pub fn decode(message: GatewayMessage) -> Result<Self, DecodeError> {
        match message.op {
            OpCode::Hello => match message.as_hello() {
                Some(hello)
                    if (1..=MAX_HEARTBEAT_INTERVAL_MS).contains(&hello.heartbeat_interval) =>
                {
                    Ok(Self::Hello(hello))
                }
                _ => Err(DecodeError::MalformedHello),
            },
            OpCode::HeartbeatAck => Ok(Self::HeartbeatAck),
            OpCode::Heartbeat => Ok(Self::HeartbeatRequest),
            OpCode::Reconnect => Ok(Self::Reconnect),
            OpCode::InvalidSession => Ok(Self::InvalidSession {
                resumable: message.as_invalid_session().unwrap_or(false),
            }),
            OpCode::Dispatch => {
                let name = message.t.ok_or(DecodeError::MissingEventType)?;
                DispatchEvent::decode(name, message.d).map(Self::Dispatch)
            }
            op => Ok(Self::Unknown { op }),
        }
    }
}

impl DispatchEvent {
    fn decode(name: String, data: Option<Value>) -> Result<Self, DecodeError> {
        let Some(event) = GatewayEventType::from_name(&name) else {
            return Ok(Self::Unknown { name });
        };

        let decoded = match event {
            GatewayEventType::Ready => Self::Ready(payload(event, data)?),
            GatewayEventType::Resumed => Self::Resumed,
            GatewayEventType::MessageCreate => Self::MessageCreate(payload(event, data)?),
            GatewayEventType::MessageReactionAdd => Self::ReactionAdd(payload(event, data)?),
            GatewayEventType::MessageReactionRemove => {
                Self::ReactionRemove(payload(event, data)?)
            }
            GatewayEventType::GuildMemberUpdate => Self::MemberUpdate(payload(event, data)?),
            GatewayEventType::PresenceUpdate => Self::Presence(payload(event, data)?),
            GatewayEventType::TypingStart => Self::TypingStart(payload(event, data)?),
            GatewayEventType::VoiceStateUpdate => Self::VoiceState(payload(event, data)?),
        };

        Ok(decoded)
    }

    /// Event type of this dispatch, if it is one this client handles
    #[must_use]
    pub fn event_type(&self) -> Option<GatewayEventType> {
        match self {
            Self::Ready(_) => Some(GatewayEventType::Ready),
            Self::Resumed => Some(GatewayEventType::Resumed),
            Self::MessageCreate(_) => Some(GatewayEventType::MessageCreate),
            Self::ReactionAdd(_) => Some(GatewayEventType::MessageReactionAdd),
            Self::ReactionRemove(_) => Some(GatewayEventType::MessageReactionRemove),
            Self::MemberUpdate(_) => Some(GatewayEventType::GuildMemberUpdate),
            Self::Presence(_) => Some(GatewayEventType::PresenceUpdate),
            Self::TypingStart(_) => Some(GatewayEventType::TypingStart),
            Self::VoiceState(_) => Some(GatewayEventType::VoiceStateUpdate),
            Self::Unknown { .. } => None,
        }
    }
}
