//! Gateway operation codes
//!
//! Codes this client does not know about decode to `OpCode::Unknown` so that a
//! single unexpected frame never fails the session.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The `op` field of a gateway frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// Event delivery; the only op carrying `t` and `s`
    Dispatch,
    /// Sent by the client on its timer, and by the server to request one
    Heartbeat,
    Identify,
    PresenceUpdate,
    VoiceStateUpdate,
    Resume,
    /// Server asks the client to reconnect and resume
    Reconnect,
    RequestGuildMembers,
    /// `d` says whether the session can still be resumed
    InvalidSession,
    /// First frame on a new link; carries the heartbeat interval
    Hello,
    HeartbeatAck,
    Unknown(u8),
}

const KNOWN: [(u8, OpCode, &str); 11] = [
    (0, OpCode::Dispatch, "Dispatch"),
    (1, OpCode::Heartbeat, "Heartbeat"),
    (2, OpCode::Identify, "Identify"),
    (3, OpCode::PresenceUpdate, "PresenceUpdate"),
    (4, OpCode::VoiceStateUpdate, "VoiceStateUpdate"),
    (6, OpCode::Resume, "Resume"),
    (7, OpCode::Reconnect, "Reconnect"),
    (8, OpCode::RequestGuildMembers, "RequestGuildMembers"),
    (9, OpCode::InvalidSession, "InvalidSession"),
    (10, OpCode::Hello, "Hello"),
    (11, OpCode::HeartbeatAck, "HeartbeatAck"),
];

impl OpCode {
    #[must_use]
    pub fn from_u8(value: u8) -> Self {
        KNOWN
            .iter()
            .find(|(raw, _, _)| *raw == value)
            .map_or(Self::Unknown(value), |(_, op, _)| *op)
    }

    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Unknown(value) => value,
            known => KNOWN
                .iter()
                .find(|(_, op, _)| *op == known)
                .map_or(u8::MAX, |(raw, _, _)| *raw),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        KNOWN
            .iter()
            .find(|(_, op, _)| *op == self)
            .map_or("Unknown", |(_, _, name)| name)
    }
}

impl Serialize for OpCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for OpCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u8::deserialize(deserializer).map(Self::from_u8)
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "op {} ({})", self.as_u8(), self.name())
    }
}
