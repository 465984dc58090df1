//! Effect policy
//!
//! Maps a command kind and its subject to the visual effect to show. The mapping
//! must be deterministic so that replayed commands land on the same end state.

use serde::{Deserialize, Serialize};
use signal_core::{CommandKind, Hue, Subject};
use std::fmt;

/// Light pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Solid,
    Pulse,
    Blink,
    /// Hue cycle used for special mentions
    Rainbow,
    Off,
}

/// Desired end state for one effect target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Effect {
    pub pattern: Pattern,
    pub hue: Option<Hue>,
}

impl Effect {
    pub const OFF: Self = Self {
        pattern: Pattern::Off,
        hue: None,
    };

    #[must_use]
    pub const fn new(pattern: Pattern, hue: Option<Hue>) -> Self {
        Self { pattern, hue }
    }

    #[must_use]
    pub const fn is_off(&self) -> bool {
        matches!(self.pattern, Pattern::Off)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hue {
            Some(hue) => write!(f, "{:?}(hue={})", self.pattern, hue.value()),
            None => write!(f, "{:?}", self.pattern),
        }
    }
}

/// Chooses the effect for a resolved command
pub trait EffectPolicy: Send + Sync {
    fn effect_for(&self, kind: CommandKind, subject: Subject, hue: Option<Hue>) -> Effect;
}

/// Built-in mapping: identity effects use the identity's hue, special role
/// effects cycle through all hues
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEffectPolicy;

impl EffectPolicy for DefaultEffectPolicy {
    fn effect_for(&self, kind: CommandKind, subject: Subject, hue: Option<Hue>) -> Effect {
        if kind.is_clearing() {
            return Effect::OFF;
        }

        if subject == Subject::SpecialRole {
            return Effect::new(Pattern::Rainbow, None);
        }

        let pattern = match kind {
            CommandKind::ReactionAdded | CommandKind::PresenceOnline => Pattern::Solid,
            CommandKind::TypingStarted | CommandKind::MemberFlagged => Pattern::Blink,
            CommandKind::VoiceJoined => Pattern::Pulse,
            CommandKind::RoleMentioned => Pattern::Rainbow,
            CommandKind::ReactionRemoved
            | CommandKind::PresenceOffline
            | CommandKind::VoiceLeft => Pattern::Off,
        };

        Effect::new(pattern, hue)
    }
}
