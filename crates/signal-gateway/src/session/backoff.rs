//! Reconnect backoff

use signal_common::BackoffConfig;
use std::time::Duration;

/// Exponential backoff: `initial * 2^attempts`, capped at `max`
#[derive(Debug, Clone)]
pub struct Backoff {
    initial_ms: u64,
    max_ms: u64,
    attempts: u32,
}

impl Backoff {
    #[must_use]
    pub fn new(initial_ms: u64, max_ms: u64) -> Self {
        Self {
            initial_ms,
            max_ms: max_ms.max(initial_ms),
            attempts: 0,
        }
    }

    /// Delay to wait before the next attempt; each call doubles the following one
    pub fn next_delay(&mut self) -> Duration {
        let factor = 1u64.checked_shl(self.attempts).unwrap_or(u64::MAX);
        let delay_ms = self.initial_ms.saturating_mul(factor).min(self.max_ms);
        self.attempts = self.attempts.saturating_add(1);
        Duration::from_millis(delay_ms)
    }

    /// Start over after a successful session
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl From<&BackoffConfig> for Backoff {
    fn from(config: &BackoffConfig) -> Self {
        Self::new(config.initial_ms, config.max_ms)
    }
}
