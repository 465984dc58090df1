//! Gateway error types

use signal_common::AppError;
use thiserror::Error;

use crate::protocol::CloseCode;
use crate::transport::CloseInfo;

/// Conditions that end the session for good
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The credential was rejected
    #[error("Authentication failed ({0})")]
    AuthenticationFailed(CloseInfo),

    /// The requested intents are invalid or not enabled for this application
    #[error("Intents rejected ({0})")]
    IntentsRejected(CloseInfo),

    /// Any other close code that forbids reconnecting
    #[error("Session rejected ({0})")]
    Rejected(CloseInfo),
}

impl GatewayError {
    /// Classify a fatal close frame
    #[must_use]
    pub fn from_close(info: CloseInfo) -> Self {
        match CloseCode::from_u16(info.code) {
            Some(CloseCode::AuthenticationFailed) => Self::AuthenticationFailed(info),
            Some(code) if code.is_intents_rejection() => Self::IntentsRejected(info),
            _ => Self::Rejected(info),
        }
    }

    /// Close frame that ended the session
    pub fn close_info(&self) -> &CloseInfo {
        match self {
            Self::AuthenticationFailed(info)
            | Self::IntentsRejected(info)
            | Self::Rejected(info) => info,
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::AuthenticationFailed(info) => {
                AppError::AuthenticationFailed(info.to_string())
            }
            GatewayError::IntentsRejected(info) => AppError::IntentsRejected(info.to_string()),
            GatewayError::Rejected(info) => AppError::Protocol(info.to_string()),
        }
    }
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;
