//! Hardware effect sink

use serde::{Deserialize, Serialize};
use signal_core::{CommandKind, Subject};
use std::fmt;

use super::Effect;

/// What an effect is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectTarget {
    /// The light assigned to a known identity
    Identity { slot: usize },
    /// The shared special mention light
    SpecialRole,
}

impl From<Subject> for EffectTarget {
    fn from(subject: Subject) -> Self {
        match subject {
            Subject::Identity { slot } => Self::Identity { slot },
            Subject::SpecialRole => Self::SpecialRole,
        }
    }
}

impl fmt::Display for EffectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity { slot } => write!(f, "identity:{slot}"),
            Self::SpecialRole => f.write_str("special-role"),
        }
    }
}

/// One request to the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRequest {
    pub target: EffectTarget,
    pub kind: CommandKind,
    pub effect: Effect,
}

/// Connection health shown on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Connecting,
    Online,
    /// Waiting before the next connection attempt
    Backoff,
    /// Stopped for good; needs operator action
    Fatal,
}

impl DeviceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Online => "online",
            Self::Backoff => "backoff",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output device; calls are fire-and-forget and must not block
pub trait EffectSink: Send + Sync {
    fn apply(&self, request: EffectRequest);

    fn indicate(&self, status: DeviceStatus);
}

/// Sink that only logs, for running without attached hardware
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEffectSink;

impl EffectSink for LogEffectSink {
    fn apply(&self, request: EffectRequest) {
        tracing::info!(
            target_light = %request.target,
            kind = %request.kind,
            effect = %request.effect,
            "Effect requested"
        );
    }

    fn indicate(&self, status: DeviceStatus) {
        tracing::info!(status = %status, "Device status");
    }
}
