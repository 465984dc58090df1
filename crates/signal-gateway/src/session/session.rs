//! Session data owned by the state machine

use crate::events::ReadyEvent;
use crate::protocol::ResumePayload;

use super::SessionState;

/// The live gateway session
///
/// Only the client mutates it. A session is either continued whole (same id and
/// last sequence) or discarded whole before a fresh identify.
#[derive(Debug, Clone, Default)]
pub struct Session {
    session_id: Option<String>,
    last_sequence: Option<u64>,
    heartbeat_interval_ms: Option<u64>,
    resume_url: Option<String>,
    state: SessionState,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    pub fn heartbeat_interval_ms(&self) -> Option<u64> {
        self.heartbeat_interval_ms
    }

    pub fn resume_url(&self) -> Option<&str> {
        self.resume_url.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Move to `next`, returning the previous state
    pub fn transition(&mut self, next: SessionState) -> SessionState {
        std::mem::replace(&mut self.state, next)
    }

    /// Record a dispatch sequence number; the stored value never decreases
    pub fn observe_sequence(&mut self, seq: u64) {
        self.last_sequence = Some(self.last_sequence.map_or(seq, |last| last.max(seq)));
    }

    pub fn set_heartbeat_interval(&mut self, interval_ms: u64) {
        self.heartbeat_interval_ms = Some(interval_ms);
    }

    /// Adopt the session described by READY
    pub fn establish(&mut self, ready: &ReadyEvent) {
        self.session_id = Some(ready.session_id.clone());
        self.resume_url = ready
            .resume_gateway_url
            .as_ref()
            .filter(|url| !url.is_empty())
            .cloned();
    }

    pub fn can_resume(&self) -> bool {
        self.session_id.is_some() && self.last_sequence.is_some()
    }

    /// Resume payload carrying the stored session id and latest sequence
    pub fn resume_payload(&self, token: &str) -> Option<ResumePayload> {
        match (&self.session_id, self.last_sequence) {
            (Some(session_id), Some(seq)) => Some(ResumePayload::new(token, session_id, seq)),
            _ => None,
        }
    }

    /// Forget the session so the next handshake identifies from scratch
    pub fn clear(&mut self) {
        self.session_id = None;
        self.last_sequence = None;
        self.resume_url = None;
    }
}
