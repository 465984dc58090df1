//! Routed commands - the dispatcher's normalized output
//!
//! A routed command describes one actionable gateway event, already narrowed to
//! the configured guild and control channel and resolved against the known-identity
//! table. Each command is consumed exactly once by the signal controller.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::IdentitySlot;
use crate::value_objects::Hue;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    // =========================================================================
    // Control channel reactions
    // =========================================================================
    ReactionAdded,
    ReactionRemoved,

    // =========================================================================
    // Member state
    // =========================================================================
    /// Member gained the special role
    MemberFlagged,
    /// Control channel message mentioned the special role
    RoleMentioned,
    PresenceOnline,
    PresenceOffline,

    // =========================================================================
    // Activity
    // =========================================================================
    TypingStarted,
    VoiceJoined,
    VoiceLeft,
}

impl CommandKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReactionAdded => "REACTION_ADDED",
            Self::ReactionRemoved => "REACTION_REMOVED",
            Self::MemberFlagged => "MEMBER_FLAGGED",
            Self::RoleMentioned => "ROLE_MENTIONED",
            Self::PresenceOnline => "PRESENCE_ONLINE",
            Self::PresenceOffline => "PRESENCE_OFFLINE",
            Self::TypingStarted => "TYPING_STARTED",
            Self::VoiceJoined => "VOICE_JOINED",
            Self::VoiceLeft => "VOICE_LEFT",
        }
    }

    /// Whether this kind clears a signal rather than setting one
    #[must_use]
    pub const fn is_clearing(self) -> bool {
        matches!(
            self,
            Self::ReactionRemoved | Self::PresenceOffline | Self::VoiceLeft
        )
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who the command is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Subject {
    /// A known identity, by its slot in the identity table
    Identity { slot: usize },
    /// The distinguished special mention role
    SpecialRole,
}

/// A single actionable event for the signal controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoutedCommand {
    pub kind: CommandKind,
    pub subject: Option<Subject>,
    pub color_hint: Option<Hue>,
}

impl RoutedCommand {
    /// Command about a resolved identity, carrying its hue as the color hint
    #[must_use]
    pub fn for_identity(kind: CommandKind, slot: &IdentitySlot) -> Self {
        Self {
            kind,
            subject: Some(Subject::Identity { slot: slot.index() }),
            color_hint: Some(slot.hue()),
        }
    }

    /// Command about the special mention role
    #[must_use]
    pub fn for_special_role(kind: CommandKind) -> Self {
        Self {
            kind,
            subject: Some(Subject::SpecialRole),
            color_hint: None,
        }
    }

    /// Command whose subject could not be resolved
    #[must_use]
    pub fn unresolved(kind: CommandKind) -> Self {
        Self {
            kind,
            subject: None,
            color_hint: None,
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.subject.is_some()
    }
}

impl fmt::Display for RoutedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subject {
            Some(Subject::Identity { slot }) => write!(f, "{}(identity={slot})", self.kind),
            Some(Subject::SpecialRole) => write!(f, "{}(special-role)", self.kind),
            None => write!(f, "{}(unresolved)", self.kind),
        }
    }
}
