//! Link abstraction between the session and the network

use async_trait::async_trait;
use std::fmt;

/// Certificate validation mode for secure endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Validate the server certificate against the webpki roots
    #[default]
    Verified,
    /// Accept any server certificate
    Insecure,
}

impl TlsMode {
    #[must_use]
    pub fn from_insecure_flag(insecure: bool) -> Self {
        if insecure {
            Self::Insecure
        } else {
            Self::Verified
        }
    }
}

/// Close frame details sent by the peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

impl CloseInfo {
    #[must_use]
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CloseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} ({})", self.code, self.reason)
        }
    }
}

/// What a link yields when read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// One complete text frame
    Frame(String),
    /// The peer closed the link, with its close frame if it sent one
    Closed(Option<CloseInfo>),
}

/// Transport failures; all of them are recoverable by reconnecting
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Receive failed: {0}")]
    Receive(String),

    #[error("Link is closed")]
    Closed,
}

/// Opens links to an endpoint
#[async_trait]
pub trait Connector: Send + Sync {
    type Link: Link;

    /// Open a link; a refused or failed handshake is an error
    async fn connect(&self, endpoint: &str, mode: TlsMode) -> Result<Self::Link, TransportError>;
}

/// A bidirectional, message-oriented connection
///
/// `receive` must be cancel-safe: the session races it against its timers.
#[async_trait]
pub trait Link: Send {
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    async fn receive(&mut self) -> Result<Inbound, TransportError>;

    async fn close(&mut self) -> Result<(), TransportError>;
}
