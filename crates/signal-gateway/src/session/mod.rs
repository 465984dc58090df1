//! Gateway session
//!
//! Session bookkeeping, heartbeat and backoff timers, and the client that
//! drives them over a single link at a time.

mod backoff;
mod client;
mod error;
mod heartbeat;
mod session;
mod state;

pub use backoff::Backoff;
pub use client::{resume_endpoint, ClientSettings, GatewayClient};
pub use error::{GatewayError, GatewayResult};
pub use heartbeat::{
    max_jitter_ms, period_with_jitter, Heartbeat, HeartbeatTick, MAX_JITTER_PERCENT,
};
pub use session::Session;
pub use state::SessionState;
