//! Handshake payload definitions
//!
//! Payloads exchanged while a session is being negotiated.

use serde::{Deserialize, Serialize};
use signal_core::GatewayIntents;

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    /// Create a Hello payload with the given interval
    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

/// Payload for op 2 (Identify)
///
/// Sent by the client to authenticate a fresh session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Bot credential, without the `Bot ` prefix
    pub token: String,

    /// Event categories to subscribe to
    pub intents: GatewayIntents,

    /// Client connection properties
    pub properties: ConnectionProperties,
}

impl IdentifyPayload {
    #[must_use]
    pub fn new(token: impl Into<String>, intents: GatewayIntents) -> Self {
        Self {
            token: token.into(),
            intents,
            properties: ConnectionProperties::default(),
        }
    }

    /// Replace the connection properties
    #[must_use]
    pub fn with_properties(mut self, properties: ConnectionProperties) -> Self {
        self.properties = properties;
        self
    }
}

/// Client connection properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProperties {
    /// Operating system
    pub os: String,

    /// Library or client name
    pub browser: String,

    /// Device name
    pub device: String,
}

impl ConnectionProperties {
    /// Name this client reports as its library and device
    pub const CLIENT_NAME: &'static str = "signal-gateway";

    #[must_use]
    pub fn new(
        os: impl Into<String>,
        browser: impl Into<String>,
        device: impl Into<String>,
    ) -> Self {
        Self {
            os: os.into(),
            browser: browser.into(),
            device: device.into(),
        }
    }
}

impl Default for ConnectionProperties {
    fn default() -> Self {
        Self::new(std::env::consts::OS, Self::CLIENT_NAME, Self::CLIENT_NAME)
    }
}

/// Payload for op 6 (Resume)
///
/// Sent by the client to continue a previous session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumePayload {
    /// Bot credential
    pub token: String,

    /// Session ID from READY
    pub session_id: String,

    /// Last sequence number received
    pub seq: u64,
}

impl ResumePayload {
    #[must_use]
    pub fn new(token: impl Into<String>, session_id: impl Into<String>, seq: u64) -> Self {
        Self {
            token: token.into(),
            session_id: session_id.into(),
            seq,
        }
    }
}
