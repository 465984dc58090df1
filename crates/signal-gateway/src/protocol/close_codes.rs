//! WebSocket close codes
//!
//! Gateway-specific close codes and how the session reacts to each of them.

use serde::{Deserialize, Serialize};

/// Close codes the gateway uses when it ends a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    UnknownError = 4000,
    UnknownOpcode = 4001,
    DecodeError = 4002,
    /// A payload arrived before Identify
    NotAuthenticated = 4003,
    /// The token is invalid
    AuthenticationFailed = 4004,
    AlreadyAuthenticated = 4005,
    /// The sequence sent with Resume was not accepted
    InvalidSequence = 4007,
    RateLimited = 4008,
    SessionTimedOut = 4009,
    InvalidShard = 4010,
    ShardingRequired = 4011,
    InvalidApiVersion = 4012,
    InvalidIntents = 4013,
    /// Privileged intent not enabled for this application
    DisallowedIntents = 4014,
}

/// What the session does after the server closed the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDisposition {
    /// Reconnect and resume the existing session
    Resume,
    /// Reconnect and identify from scratch
    Reidentify,
    /// Stop; retrying cannot succeed
    Fatal,
}

impl CloseCode {
    const ALL: [Self; 14] = [
        Self::UnknownError,
        Self::UnknownOpcode,
        Self::DecodeError,
        Self::NotAuthenticated,
        Self::AuthenticationFailed,
        Self::AlreadyAuthenticated,
        Self::InvalidSequence,
        Self::RateLimited,
        Self::SessionTimedOut,
        Self::InvalidShard,
        Self::ShardingRequired,
        Self::InvalidApiVersion,
        Self::InvalidIntents,
        Self::DisallowedIntents,
    ];

    /// Look up a gateway close code; standard WebSocket codes yield `None`
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_u16() == value)
    }

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Decide how the session continues after this close code
    #[must_use]
    pub const fn disposition(self) -> CloseDisposition {
        match self {
            Self::AuthenticationFailed
            | Self::InvalidShard
            | Self::ShardingRequired
            | Self::InvalidApiVersion
            | Self::InvalidIntents
            | Self::DisallowedIntents => CloseDisposition::Fatal,
            Self::InvalidSequence | Self::SessionTimedOut => CloseDisposition::Reidentify,
            _ => CloseDisposition::Resume,
        }
    }

    /// Whether the server refused the requested intents
    #[must_use]
    pub const fn is_intents_rejection(self) -> bool {
        matches!(self, Self::InvalidIntents | Self::DisallowedIntents)
    }

    /// Operator-facing explanation
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "the gateway hit an internal error",
            Self::UnknownOpcode => "the client sent an opcode the gateway does not accept",
            Self::DecodeError => "the gateway could not decode a client payload",
            Self::NotAuthenticated => "a payload was sent before identifying",
            Self::AuthenticationFailed => "the bot token was rejected",
            Self::AlreadyAuthenticated => "the client identified twice",
            Self::InvalidSequence => "the resume sequence was rejected",
            Self::RateLimited => "the client sent payloads too quickly",
            Self::SessionTimedOut => "the session expired",
            Self::InvalidShard => "the shard settings are invalid",
            Self::ShardingRequired => "the bot must shard its connections",
            Self::InvalidApiVersion => "the gateway version is not supported",
            Self::InvalidIntents => "the intents value is malformed",
            Self::DisallowedIntents => "a privileged intent is not enabled for the bot",
        }
    }
}

/// Disposition for a raw close code, including codes outside the gateway range
///
/// Standard WebSocket closes (1000-1015), unknown codes and a missing close
/// frame are treated as transient.
#[must_use]
pub fn disposition_for(code: Option<u16>) -> CloseDisposition {
    code.and_then(CloseCode::from_u16)
        .map_or(CloseDisposition::Resume, CloseCode::disposition)
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.as_u16(), self.description())
    }
}
