//! Application error types
//!
//! Unified error handling at the process boundary. Transient failures are handled
//! inside the gateway session and never reach this type; what arrives here either
//! stops startup or ends the process.

use signal_core::IdentityError;
use std::fmt;

use crate::config::ConfigError;
use crate::telemetry::TracingError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Gateway rejected the credential: {0}")]
    AuthenticationFailed(String),

    #[error("Gateway rejected the requested intents: {0}")]
    IntentsRejected(String),

    // Protocol errors the session cannot recover from
    #[error("Gateway protocol error: {0}")]
    Protocol(String),

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    // Startup errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Telemetry(#[from] TracingError),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Get error code for operator-facing reports
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed(_) => "AUTHENTICATION_FAILED",
            Self::IntentsRejected(_) => "INTENTS_REJECTED",
            Self::Protocol(_) => "PROTOCOL_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Identity(e) => e.code(),
            Self::Telemetry(_) => "TELEMETRY_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying with the same configuration cannot succeed
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed(_)
                | Self::IntentsRejected(_)
                | Self::Protocol(_)
                | Self::Config(_)
                | Self::Identity(_)
        )
    }

    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Identity(_) => 78,
            Self::AuthenticationFailed(_) | Self::IntentsRejected(_) => 77,
            _ => 1,
        }
    }

    /// Create a transport error
    #[must_use]
    pub fn transport(msg: impl fmt::Display) -> Self {
        Self::Transport(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
