//! Session lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// No link; waiting to connect or stopped
    #[default]
    Disconnected,
    /// Opening the link
    Connecting,
    /// Link open, waiting for Hello
    AwaitingHello,
    /// Identify sent, waiting for READY
    Identifying,
    /// Resume sent, waiting for RESUMED
    Resuming,
    /// Session live
    Established,
    /// Dropping the link to connect again
    Reconnecting,
    /// Shutting down
    Closing,
}

impl SessionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "DISCONNECTED",
            Self::Connecting => "CONNECTING",
            Self::AwaitingHello => "AWAITING_HELLO",
            Self::Identifying => "IDENTIFYING",
            Self::Resuming => "RESUMING",
            Self::Established => "ESTABLISHED",
            Self::Reconnecting => "RECONNECTING",
            Self::Closing => "CLOSING",
        }
    }

    /// Whether dispatches arriving in this state are routed
    ///
    /// Events replayed during a resume arrive before RESUMED.
    #[must_use]
    pub const fn routes_dispatches(self) -> bool {
        matches!(self, Self::Established | Self::Resuming)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
