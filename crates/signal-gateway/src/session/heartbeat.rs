//! Heartbeat cadence and ACK tracking
//!
//! Each heartbeat must be acknowledged before the next one is due. The period
//! is the server's interval shortened by a uniform random jitter, so the ACK
//! window is at most the interval and never `interval + jitter`: a dead link
//! is detected early rather than late.

use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

/// Highest jitter accepted, as a percentage of the interval
pub const MAX_JITTER_PERCENT: u8 = 10;

/// Result of a heartbeat timer expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatTick {
    /// Send the next heartbeat
    Send,
    /// The previous heartbeat was never acknowledged
    Missed,
}

/// Heartbeat timer for one link
#[derive(Debug, Clone)]
pub struct Heartbeat {
    interval_ms: u64,
    jitter_percent: u8,
    deadline: Instant,
    awaiting_ack: bool,
}

impl Heartbeat {
    /// Start the timer; the first heartbeat is due one jittered period from `now`
    #[must_use]
    pub fn start(interval_ms: u64, jitter_percent: u8, now: Instant) -> Self {
        let jitter_percent = jitter_percent.min(MAX_JITTER_PERCENT);
        Self {
            interval_ms,
            jitter_percent,
            deadline: now + next_period(interval_ms, jitter_percent),
            awaiting_ack: false,
        }
    }

    /// When the timer next fires
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn is_awaiting_ack(&self) -> bool {
        self.awaiting_ack
    }

    /// Handle the timer firing at `now`
    ///
    /// An ACK still outstanding from the previous heartbeat is a miss. The
    /// window for that ACK is the jittered period, deliberately shorter than
    /// the server's interval.
    pub fn tick(&mut self, now: Instant) -> HeartbeatTick {
        if self.awaiting_ack {
            return HeartbeatTick::Missed;
        }
        self.awaiting_ack = true;
        self.deadline = now + next_period(self.interval_ms, self.jitter_percent);
        HeartbeatTick::Send
    }

    pub fn acknowledge(&mut self) {
        self.awaiting_ack = false;
    }
}

/// Period for a given interval and jitter offset
#[must_use]
pub fn period_with_jitter(interval_ms: u64, jitter_ms: u64) -> Duration {
    Duration::from_millis(interval_ms.saturating_sub(jitter_ms).max(1))
}

/// Largest jitter offset for `interval_ms`
#[must_use]
pub fn max_jitter_ms(interval_ms: u64, jitter_percent: u8) -> u64 {
    interval_ms.saturating_mul(u64::from(jitter_percent.min(MAX_JITTER_PERCENT))) / 100
}

fn next_period(interval_ms: u64, jitter_percent: u8) -> Duration {
    let max_jitter = max_jitter_ms(interval_ms, jitter_percent);
    let jitter = if max_jitter == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..=max_jitter)
    };
    period_with_jitter(interval_ms, jitter)
}
